use crate::parsing::rope::span::Span;

use super::{
    classify::{LineClass, LineKind},
    kinds::{CodeFence, FenceSig},
    types::{Section, SectionKind},
};

/// Splits a document into [`Section`]s, one line at a time.
///
/// Fenced code is opaque: once a fence opens, every line belongs to it until a
/// line made of exactly the same marker run closes it. Outside fences:
///
/// - headings, fence openers and rules always start a fresh section (headings
///   and rules are single-line);
/// - a line whose kind differs from the running section's starts a new one
///   unless one of the two is a paragraph line;
/// - a paragraph line directly under a list item or quote is a lazy
///   continuation of it, but after a blank line it starts a paragraph;
/// - list, table and quote lines never continue a paragraph run;
/// - blank lines end tables and quotes, and are kept inside paragraph runs
///   and lists.
#[derive(Debug, Default)]
pub struct BlockSegmenter {
    open: Option<Section>,
    fence: Option<FenceSig>,
    after_blank: bool,
    out: Vec<Section>,
}

impl BlockSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: &LineClass) {
        if let Some(sig) = self.fence {
            self.extend(c);
            if CodeFence::closes(sig, &c.text) {
                self.fence = None;
                self.flush();
            }
            return;
        }

        match c.kind {
            LineKind::Blank => {
                match self.open.as_ref().map(|s| s.kind) {
                    Some(SectionKind::Paragraph | SectionKind::List) => self.extend(c),
                    _ => self.flush(),
                }
                self.after_blank = true;
                return;
            }
            LineKind::FenceOpen => {
                self.flush();
                self.fence = CodeFence::open(&c.text).map(|o| o.sig);
                self.start(SectionKind::Code, c);
            }
            LineKind::Heading => {
                self.flush();
                self.start(SectionKind::Heading, c);
                self.flush();
            }
            LineKind::Rule => {
                self.flush();
                self.start(SectionKind::Rule, c);
                self.flush();
            }
            LineKind::TableRow | LineKind::ListItem | LineKind::Quote | LineKind::Paragraph => {
                let kind = section_kind(c.kind);
                match self.open.as_ref().map(|s| s.kind) {
                    Some(current) if current == kind => self.extend(c),
                    Some(SectionKind::List | SectionKind::Quote)
                        if kind == SectionKind::Paragraph && !self.after_blank =>
                    {
                        self.extend(c);
                    }
                    _ => {
                        self.flush();
                        self.start(kind, c);
                    }
                }
            }
        }
        self.after_blank = false;
    }

    pub fn finish(mut self) -> Vec<Section> {
        // EOF flush; an unterminated fence is still emitted as code.
        self.flush();
        self.out
    }

    fn start(&mut self, kind: SectionKind, c: &LineClass) {
        self.open = Some(Section {
            kind,
            span: c.line,
            lines: vec![c.text.clone()],
        });
    }

    fn extend(&mut self, c: &LineClass) {
        if let Some(section) = self.open.as_mut() {
            section.span = Span::new(section.span.start, c.line.end);
            section.lines.push(c.text.clone());
        }
    }

    fn flush(&mut self) {
        if let Some(mut section) = self.open.take() {
            if section.kind != SectionKind::Code {
                while section.lines.last().is_some_and(|l| l.trim().is_empty()) {
                    section.lines.pop();
                }
            }
            self.out.push(section);
        }
    }
}

fn section_kind(kind: LineKind) -> SectionKind {
    match kind {
        LineKind::TableRow => SectionKind::Table,
        LineKind::ListItem => SectionKind::List,
        LineKind::Quote => SectionKind::Quote,
        _ => SectionKind::Paragraph,
    }
}
