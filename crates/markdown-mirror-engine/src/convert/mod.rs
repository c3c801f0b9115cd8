//! # Block Conversion
//!
//! Turns segmented [`Section`]s into destination-independent [`Block`]s,
//! delegating inline text to [`parse_rich_text`].
//!
//! Conversion never fails a document: a section that cannot be converted
//! becomes a plain paragraph holding its raw text, and the problem is
//! reported as a [`Degradation`].

pub mod code;
pub mod media;
pub mod table;

use crate::models::{Block, RichText};
use crate::parsing::{
    blocks::{
        Section, SectionKind,
        kinds::{BlockQuote, CodeFence, Heading, ListMarker},
    },
    inline::parse_rich_text,
    rope::Span,
    segment_document,
};

/// A section that fell back to a plain paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
    pub span: Span,
    pub reason: String,
}

/// Result of converting a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub blocks: Vec<Block>,
    pub degradations: Vec<Degradation>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockConverter;

impl BlockConverter {
    pub fn new() -> Self {
        Self
    }

    /// Segments and converts `text`.
    pub fn convert_document(&self, text: &str) -> ConvertedDocument {
        let mut doc = ConvertedDocument::default();
        for section in segment_document(text) {
            match self.convert_section(&section) {
                Ok(blocks) => doc.blocks.extend(blocks),
                Err(reason) => {
                    log::warn!(
                        "Falling back to plain paragraph at bytes {}..{}: {reason}",
                        section.span.start,
                        section.span.end
                    );
                    doc.blocks
                        .push(Block::paragraph(RichText::plain(&section.raw_text())));
                    doc.degradations.push(Degradation {
                        span: section.span,
                        reason: reason.to_string(),
                    });
                }
            }
        }
        doc
    }

    /// Converts one section into one or more blocks.
    pub fn convert_section(&self, section: &Section) -> Result<Vec<Block>, &'static str> {
        match section.kind {
            SectionKind::Heading => convert_heading(section).map(|b| vec![b]),
            SectionKind::Rule => Ok(vec![Block::Divider]),
            SectionKind::Code => convert_code(section).map(|b| vec![b]),
            SectionKind::Table => table::convert_table(&section.lines).map(|b| vec![b]),
            SectionKind::List => convert_list(section),
            SectionKind::Quote => Ok(vec![convert_quote(section)]),
            SectionKind::Paragraph => Ok(convert_paragraphs(section)),
        }
    }
}

fn convert_heading(section: &Section) -> Result<Block, &'static str> {
    let line = section.lines.first().ok_or("empty heading section")?;
    let (level, text) = Heading::parse(line).ok_or("line is not a heading")?;
    let level = u8::try_from(level)
        .unwrap_or(Block::MAX_HEADING_LEVEL)
        .min(Block::MAX_HEADING_LEVEL);
    Ok(Block::Heading {
        level,
        text: parse_rich_text(text),
    })
}

fn convert_code(section: &Section) -> Result<Block, &'static str> {
    let first = section.lines.first().ok_or("empty code section")?;
    let open = CodeFence::open(first).ok_or("code section has no fence opener")?;

    let last = section.lines.len();
    let body_end = if last > 1 && CodeFence::closes(open.sig, &section.lines[last - 1]) {
        last - 1
    } else {
        last
    };
    let (language, caption) = code::parse_info(open.info);

    Ok(Block::CodeBlock {
        language,
        code: section.lines[1..body_end].join("\n"),
        caption,
    })
}

/// Every marker line is its own item; indentation is not modelled, so nested
/// items come out as siblings. Continuation lines join the previous item.
fn convert_list(section: &Section) -> Result<Vec<Block>, &'static str> {
    struct Item {
        marker: (crate::models::ListKind, Option<bool>),
        text: String,
    }

    let mut items: Vec<Item> = Vec::new();
    for line in &section.lines {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(m) = ListMarker::parse(line) {
            items.push(Item {
                marker: (m.kind, m.checked),
                text: m.content.to_string(),
            });
        } else {
            let item = items.last_mut().ok_or("list section starts with a non-item line")?;
            item.text.push('\n');
            item.text.push_str(line.trim());
        }
    }

    Ok(items
        .into_iter()
        .map(|item| Block::ListItem {
            kind: item.marker.0,
            checked: item.marker.1,
            text: parse_rich_text(&item.text),
        })
        .collect())
}

fn convert_quote(section: &Section) -> Block {
    let text = section
        .lines
        .iter()
        .map(|line| BlockQuote::content(line).trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    Block::Quote {
        text: parse_rich_text(text.trim()),
    }
}

/// Splits a paragraph run on blank lines. Soft line breaks become spaces; a
/// line ending in two spaces or a backslash keeps a hard break.
fn convert_paragraphs(section: &Section) -> Vec<Block> {
    let mut blocks = Vec::new();
    for group in section.lines.split(|l| l.trim().is_empty()) {
        if group.is_empty() {
            continue;
        }
        let mut text = String::new();
        for (i, line) in group.iter().enumerate() {
            let hard_break = line.ends_with("  ") || line.ends_with('\\');
            text.push_str(line.trim().trim_end_matches('\\'));
            if i + 1 < group.len() {
                text.push(if hard_break { '\n' } else { ' ' });
            }
        }

        blocks.push(
            media::standalone_media(&text)
                .unwrap_or_else(|| Block::paragraph(parse_rich_text(&text))),
        );
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListKind, MediaKind};
    use pretty_assertions::assert_eq;

    fn convert(doc: &str) -> Vec<Block> {
        BlockConverter::new().convert_document(doc).blocks
    }

    fn text_of(block: &Block) -> String {
        match block {
            Block::Heading { text, .. }
            | Block::Paragraph { text }
            | Block::ListItem { text, .. }
            | Block::Quote { text } => text.plain_text(),
            other => panic!("block has no text: {other:?}"),
        }
    }

    #[test]
    fn heading_levels_are_capped() {
        let blocks = convert("# One\n#### Four\n");
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(blocks[1], Block::Heading { level: 3, .. }));
        assert_eq!(text_of(&blocks[1]), "Four");
    }

    #[test]
    fn fenced_heading_stays_in_code_block() {
        let blocks = convert("```\n# not a heading\n```\n");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: String::new(),
                code: "# not a heading".into(),
                caption: None,
            }]
        );
    }

    #[test]
    fn four_backtick_fence_keeps_inner_fences() {
        let blocks =
            convert("````markdown title=\"example.md\"\n```rust\nfn main() {}\n```\n````\n");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: "markdown".into(),
                code: "```rust\nfn main() {}\n```".into(),
                caption: Some("example.md".into()),
            }]
        );
    }

    #[test]
    fn list_items_are_flat() {
        let blocks = convert("- a\n  - nested\n1. one\n- [x] done\n- [ ] todo\n");
        let shape: Vec<_> = blocks
            .iter()
            .map(|b| match b {
                Block::ListItem { kind, checked, .. } => (*kind, *checked),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                (ListKind::Bullet, None),
                (ListKind::Bullet, None),
                (ListKind::Numbered, None),
                (ListKind::Task, Some(true)),
                (ListKind::Task, Some(false)),
            ]
        );
    }

    #[test]
    fn list_continuation_lines_join_previous_item() {
        let blocks = convert("- first line\n  second line\n- next\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(text_of(&blocks[0]), "first line\nsecond line");
    }

    #[test]
    fn quote_markers_are_stripped() {
        let blocks = convert("> line one\n> line **two**\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "line one\nline two");
    }

    #[test]
    fn paragraph_runs_split_on_blank_lines() {
        let blocks = convert("one\nstill one\n\ntwo\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(text_of(&blocks[0]), "one still one");
        assert_eq!(text_of(&blocks[1]), "two");
    }

    #[test]
    fn hard_breaks_survive() {
        let blocks = convert("one  \ntwo\\\nthree\n");
        assert_eq!(text_of(&blocks[0]), "one\ntwo\nthree");
    }

    #[test]
    fn lone_image_paragraph_is_media() {
        let blocks = convert("Before\n\n![Diagram](img/d.png)\n\nAfter\n");
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            Block::MediaRef {
                kind: MediaKind::Image,
                locator: "img/d.png".into(),
                caption: Some("Diagram".into()),
            }
        );
    }

    #[test]
    fn rule_becomes_divider() {
        assert_eq!(
            convert("a\n\n---\n\nb\n")
                .iter()
                .map(Block::kind_name)
                .collect::<Vec<_>>(),
            vec!["paragraph", "divider", "paragraph"]
        );
    }

    #[test]
    fn malformed_table_degrades_to_raw_paragraph() {
        let doc = BlockConverter::new().convert_document("| a | b |\n| 1 | 2 |\n");
        assert_eq!(doc.degradations.len(), 1);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(text_of(&doc.blocks[0]), "| a | b |\n| 1 | 2 |");
    }

    #[test]
    fn table_rows_are_rectangular() {
        let blocks = convert("| a | b | c |\n|---|---|---|\n| 1 | 2 |\n");
        let Block::Table { width, rows } = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(*width, 3);
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1][2].plain_text(), "");
    }
}
