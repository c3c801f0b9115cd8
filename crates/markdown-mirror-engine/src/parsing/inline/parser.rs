use regex::{Captures, Regex};

use crate::models::{Annotations, RichText, TextSpan};
use crate::parsing::rope::Span;

use super::{
    kinds::{Bold, CodeSpan, Image, Italic, Link, Strikethrough},
    links::normalize_link_target,
    types::{InlineKind, InlineMatch},
};

/// Parses one line or paragraph of raw text into a [`RichText`].
///
/// Every construct class is scanned independently over the whole input, in
/// precedence order. A candidate is discarded when its range overlaps a match
/// already accepted from a higher-precedence class. Accepted matches are then
/// sorted by offset and the gaps are emitted as unannotated spans, so the
/// `source` ranges of the result tile the input exactly.
///
/// Never fails: anything that does not match a complete construct is plain
/// text.
pub fn parse_rich_text(text: &str) -> RichText {
    let matches = scan(text);
    let mut out = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0usize;

    for m in matches {
        if m.full.start > cursor {
            let gap = Span::new(cursor, m.full.start);
            out.push(TextSpan::plain(gap.slice(text), gap));
        }
        out.push(emit(text, &m));
        cursor = m.full.end;
    }
    if cursor < text.len() {
        let gap = Span::new(cursor, text.len());
        out.push(TextSpan::plain(gap.slice(text), gap));
    }

    RichText(out)
}

/// Runs the precedence scan and returns accepted matches sorted by start.
pub fn scan(text: &str) -> Vec<InlineMatch> {
    let mut accepted: Vec<InlineMatch> = Vec::new();

    accept_class(text, Image::pattern(), &mut accepted, |caps| {
        Some(InlineKind::Image {
            alt: group(caps, 1)?,
            src: group(caps, 2)?,
        })
    });
    accept_class(text, Link::pattern(), &mut accepted, |caps| {
        Some(InlineKind::Link {
            text: group(caps, 1)?,
            target: group(caps, 2)?,
        })
    });
    accept_class(text, CodeSpan::pattern(), &mut accepted, |caps| {
        Some(InlineKind::Code {
            inner: group(caps, 1)?,
        })
    });
    accept_bold(text, &mut accepted);
    accept_class(text, Italic::pattern(), &mut accepted, |caps| {
        let full = caps.get(0)?;
        if !Italic::has_word_boundaries(text, full.start(), full.end()) {
            return None;
        }
        Some(InlineKind::Italic {
            inner: group(caps, 1).or_else(|| group(caps, 2))?,
        })
    });
    accept_class(text, Strikethrough::pattern(), &mut accepted, |caps| {
        Some(InlineKind::Strikethrough {
            inner: group(caps, 1)?,
        })
    });

    accepted.sort_by_key(|m| m.full.start);
    accepted
}

fn group(caps: &Captures<'_>, i: usize) -> Option<Span> {
    caps.get(i).map(|m| Span::new(m.start(), m.end()))
}

fn overlaps_any(accepted: &[InlineMatch], span: Span) -> bool {
    accepted.iter().any(|m| m.full.overlaps(span))
}

fn accept_class(
    text: &str,
    re: &Regex,
    accepted: &mut Vec<InlineMatch>,
    classify: impl Fn(&Captures<'_>) -> Option<InlineKind>,
) {
    let mut found = Vec::new();
    for caps in re.captures_iter(text) {
        let Some(full) = caps.get(0) else { continue };
        let full = Span::new(full.start(), full.end());
        if overlaps_any(accepted, full) {
            continue;
        }
        if let Some(kind) = classify(&caps) {
            found.push(InlineMatch { full, kind });
        }
    }
    // Same-class matches never overlap each other, so they are committed together.
    accepted.extend(found);
}

/// Bold gets special handling: a bold run whose whole inner text is a single
/// link replaces that link with one combined bold-link match.
fn accept_bold(text: &str, accepted: &mut Vec<InlineMatch>) {
    let mut found = Vec::new();
    for caps in Bold::pattern().captures_iter(text) {
        let inner = group(&caps, 1).or_else(|| group(&caps, 2));
        let (Some(full), Some(inner)) = (group(&caps, 0), inner) else {
            continue;
        };

        if let Some(link_caps) = Link::whole().captures(inner.slice(text)) {
            let wrapped = accepted
                .iter()
                .position(|m| m.full == inner && matches!(m.kind, InlineKind::Link { .. }));
            let others_clear = accepted
                .iter()
                .enumerate()
                .all(|(i, m)| Some(i) == wrapped || !m.full.overlaps(full));
            if let (Some(idx), true) = (wrapped, others_clear) {
                accepted.remove(idx);
                let offset = |g: usize| {
                    group(&link_caps, g)
                        .map(|s| Span::new(s.start + inner.start, s.end + inner.start))
                };
                if let (Some(text_span), Some(target)) = (offset(1), offset(2)) {
                    found.push(InlineMatch {
                        full,
                        kind: InlineKind::BoldLink {
                            text: text_span,
                            target,
                        },
                    });
                }
                continue;
            }
        }

        if !overlaps_any(accepted, full) {
            found.push(InlineMatch {
                full,
                kind: InlineKind::Bold { inner },
            });
        }
    }
    accepted.extend(found);
}

fn emit(text: &str, m: &InlineMatch) -> TextSpan {
    let source = m.full;
    let literal = || TextSpan::plain(source.slice(text), source);
    match m.kind {
        InlineKind::Image { alt, src } => match normalize_link_target(src.slice(text)) {
            Some(url) => {
                let alt = alt.slice(text);
                let content = if alt.is_empty() { url.clone() } else { alt.to_string() };
                TextSpan::plain(content, source).with_link(Some(url))
            }
            None => literal(),
        },
        InlineKind::Link { text: label, target } => {
            match normalize_link_target(target.slice(text)) {
                Some(url) => TextSpan::plain(label.slice(text), source).with_link(Some(url)),
                None => literal(),
            }
        }
        InlineKind::BoldLink { text: label, target } => {
            match normalize_link_target(target.slice(text)) {
                Some(url) => TextSpan::annotated(label.slice(text), Annotations::BOLD, source)
                    .with_link(Some(url)),
                None => {
                    // Keep the bold, drop the unresolvable link. Both bold
                    // delimiters are two bytes wide.
                    let inner = Span::new(source.start + 2, source.end - 2);
                    TextSpan::annotated(inner.slice(text), Annotations::BOLD, source)
                }
            }
        }
        InlineKind::Code { inner } => {
            TextSpan::annotated(inner.slice(text), Annotations::CODE, source)
        }
        InlineKind::Bold { inner } => {
            TextSpan::annotated(inner.slice(text), Annotations::BOLD, source)
        }
        InlineKind::Italic { inner } => {
            TextSpan::annotated(inner.slice(text), Annotations::ITALIC, source)
        }
        InlineKind::Strikethrough { inner } => {
            TextSpan::annotated(inner.slice(text), Annotations::STRIKETHROUGH, source)
        }
    }
}
