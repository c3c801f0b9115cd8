use serde::{Deserialize, Serialize};

use super::rich_text::RichText;

/// The marker style of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Bullet,
    Numbered,
    Task,
}

/// Whether a media reference points at an image or an arbitrary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    File,
}

/// A destination-independent content block.
///
/// Renderers translate these into whatever nestable-block schema a given
/// destination uses; nothing here knows about a concrete platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        /// 1..=3
        level: u8,
        text: RichText,
    },
    Paragraph {
        text: RichText,
    },
    ListItem {
        kind: ListKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        text: RichText,
    },
    /// Always rectangular: every row holds exactly `width` cells.
    Table {
        width: usize,
        rows: Vec<Vec<RichText>>,
    },
    CodeBlock {
        language: String,
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Quote {
        text: RichText,
    },
    Divider,
    MediaRef {
        kind: MediaKind,
        locator: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl Block {
    /// Deepest heading level the destination supports.
    pub const MAX_HEADING_LEVEL: u8 = 3;

    pub fn paragraph(text: RichText) -> Self {
        Block::Paragraph { text }
    }

    /// Short variant name for logs and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::ListItem { .. } => "list_item",
            Block::Table { .. } => "table",
            Block::CodeBlock { .. } => "code_block",
            Block::Quote { .. } => "quote",
            Block::Divider => "divider",
            Block::MediaRef { .. } => "media_ref",
        }
    }
}
