use crate::parsing::rope::{lines::LineRef, span::Span};

use super::kinds::{BlockQuote, CodeFence, Heading, ListMarker, TableRow, ThematicBreak};

/// What a single line looks like on its own, outside any fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    FenceOpen,
    Rule,
    TableRow,
    ListItem,
    Quote,
    Paragraph,
    Blank,
}

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of segmentation: each line is classified independently
/// without reference to surrounding context. Inside a fence the segmenter
/// ignores `kind` and only asks whether the line closes the fence.
#[derive(Debug, Clone)]
pub struct LineClass {
    /// Full byte span of this line in the rope.
    pub line: Span,
    pub kind: LineKind,
    /// Line text without its line terminator.
    pub text: String,
}

/// Classifies individual lines for the segmentation phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownLineClassifier;

impl MarkdownLineClassifier {
    /// Classifies a line into a [`LineClass`].
    ///
    /// Order matters: a fence opener beats everything, and a thematic break
    /// is checked before list markers so `* * *` is a rule, not a bullet.
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let text = lr.content();
        LineClass {
            line: lr.span,
            kind: Self::kind_of(text),
            text: text.to_string(),
        }
    }

    pub fn kind_of(text: &str) -> LineKind {
        if text.trim().is_empty() {
            LineKind::Blank
        } else if CodeFence::open(text).is_some() {
            LineKind::FenceOpen
        } else if Heading::parse(text).is_some() {
            LineKind::Heading
        } else if ThematicBreak::is_rule(text) {
            LineKind::Rule
        } else if TableRow::is_row(text) {
            LineKind::TableRow
        } else if BlockQuote::is_quote(text) {
            LineKind::Quote
        } else if ListMarker::parse(text).is_some() {
            LineKind::ListItem
        } else {
            LineKind::Paragraph
        }
    }
}
