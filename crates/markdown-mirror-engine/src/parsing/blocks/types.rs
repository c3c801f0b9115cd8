use crate::parsing::rope::span::Span;

/// The kind of a segmented section. Each kind converts to one cohesive group
/// of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Heading,
    Code,
    Rule,
    Table,
    List,
    Quote,
    Paragraph,
}

/// A contiguous run of source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Byte span from the first line's start to the last line's end.
    pub span: Span,
    /// Line texts without terminators, in source order.
    pub lines: Vec<String>,
}

impl Section {
    pub fn raw_text(&self) -> String {
        self.lines.join("\n")
    }
}
