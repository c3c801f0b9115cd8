//! Seams for uploading local media and rendering diagrams.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::{Block, MediaKind, RichText};

/// Code block languages offered to the asset processor as diagrams.
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "plantuml"];

pub fn is_diagram_language(language: &str) -> bool {
    DIAGRAM_LANGUAGES.contains(&language)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRequest {
    Image { path: PathBuf },
    File { path: PathBuf },
    Diagram { language: String, source: String },
}

/// Something the destination can reference from a media block: an uploaded
/// file handle or a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAsset {
    pub reference: String,
    pub kind: MediaKind,
}

/// Uploads or renders an asset. `None` means it could not be processed; the
/// caller falls back to text.
#[async_trait]
pub trait AssetProcessor: Send + Sync {
    async fn process(&self, request: AssetRequest) -> Option<RemoteAsset>;
}

/// Processes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetProcessor for NoAssets {
    async fn process(&self, _request: AssetRequest) -> Option<RemoteAsset> {
        None
    }
}

/// The paragraph a media reference degrades to: its source syntax, verbatim.
pub fn literal_media(kind: MediaKind, locator: &str, caption: Option<&str>) -> Block {
    let bang = match kind {
        MediaKind::Image => "!",
        MediaKind::File => "",
    };
    let text = format!("{bang}[{}]({locator})", caption.unwrap_or_default());
    Block::paragraph(RichText::plain(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_media_keeps_source_syntax() {
        assert_eq!(
            literal_media(MediaKind::Image, "img/a.png", Some("Arch")),
            Block::paragraph(RichText::plain("![Arch](img/a.png)"))
        );
        assert_eq!(
            literal_media(MediaKind::File, "datasheet.pdf", None),
            Block::paragraph(RichText::plain("[](datasheet.pdf)"))
        );
    }
}
