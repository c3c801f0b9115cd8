use crate::parsing::rope::Span;

/// What an accepted inline match turned out to be.
///
/// Inner spans are byte ranges into the parsed text, never copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineKind {
    Image { alt: Span, src: Span },
    Link { text: Span, target: Span },
    Code { inner: Span },
    Bold { inner: Span },
    /// `**[text](target)**` flattened into one bold span carrying the link.
    BoldLink { text: Span, target: Span },
    Italic { inner: Span },
    Strikethrough { inner: Span },
}

/// A match accepted by the precedence scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineMatch {
    /// Full span including delimiters.
    pub full: Span,
    pub kind: InlineKind,
}
