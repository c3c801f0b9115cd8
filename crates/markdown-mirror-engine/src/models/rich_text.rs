use serde::{Deserialize, Serialize};

use crate::parsing::rope::Span;

/// Inline formatting flags carried by a [`TextSpan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Annotations {
    pub const BOLD: Self = Self {
        bold: true,
        italic: false,
        code: false,
        strikethrough: false,
    };
    pub const ITALIC: Self = Self {
        bold: false,
        italic: true,
        code: false,
        strikethrough: false,
    };
    pub const CODE: Self = Self {
        bold: false,
        italic: false,
        code: true,
        strikethrough: false,
    };
    pub const STRIKETHROUGH: Self = Self {
        bold: false,
        italic: false,
        code: false,
        strikethrough: true,
    };

    /// True when no flag is set.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// One run of text with uniform formatting.
///
/// `content` is the visible text (markup delimiters removed); `source` is the
/// byte range of the construct in the parsed input, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub content: String,
    #[serde(default, skip_serializing_if = "Annotations::is_plain")]
    pub annotations: Annotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip)]
    pub source: Span,
}

impl TextSpan {
    pub fn plain(content: impl Into<String>, source: Span) -> Self {
        Self {
            content: content.into(),
            annotations: Annotations::default(),
            link: None,
            source,
        }
    }

    pub fn annotated(content: impl Into<String>, annotations: Annotations, source: Span) -> Self {
        Self {
            content: content.into(),
            annotations,
            link: None,
            source,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }
}

/// An ordered sequence of [`TextSpan`]s making up one block's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<TextSpan>);

impl RichText {
    /// A single unannotated span covering `text`.
    pub fn plain(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self(vec![TextSpan::plain(text, Span::new(0, text.len()))])
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|s| s.content.is_empty())
    }

    /// Concatenated visible text of every span.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(|s| s.content.as_str()).collect()
    }
}

impl From<Vec<TextSpan>> for RichText {
    fn from(spans: Vec<TextSpan>) -> Self {
        Self(spans)
    }
}
