use std::path::Path;

use crate::models::{Block, MediaKind};
use crate::parsing::inline::{
    kinds::{Image, Link},
    links::normalize_link_target,
};

/// Extensions a bare link may point at to become a file attachment.
pub const ATTACHMENT_EXTENSIONS: &[&str] = &["pdf", "zip", "docx", "xlsx", "pptx", "csv"];

/// Converts a paragraph that consists solely of one media reference.
///
/// `![alt](src)` becomes an image; `[label](local.pdf)` pointing at a local
/// attachment becomes a file. Anything else returns `None`.
pub fn standalone_media(paragraph: &str) -> Option<Block> {
    let text = paragraph.trim();

    if let Some(caps) = Image::whole().captures(text) {
        let alt = caps.get(1).map_or("", |m| m.as_str()).trim();
        return Some(Block::MediaRef {
            kind: MediaKind::Image,
            locator: caps.get(2)?.as_str().to_string(),
            caption: (!alt.is_empty()).then(|| alt.to_string()),
        });
    }

    let caps = Link::whole().captures(text)?;
    let target = caps.get(2)?.as_str();
    if !is_local_attachment(target) {
        return None;
    }
    Some(Block::MediaRef {
        kind: MediaKind::File,
        locator: target.to_string(),
        caption: caps.get(1).map(|m| m.as_str().to_string()),
    })
}

fn is_local_attachment(target: &str) -> bool {
    if normalize_link_target(target).is_some() || target.contains("://") {
        return false;
    }
    Path::new(target)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ATTACHMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_image_becomes_media() {
        assert_eq!(
            standalone_media("![Architecture](./img/arch.png)"),
            Some(Block::MediaRef {
                kind: MediaKind::Image,
                locator: "./img/arch.png".into(),
                caption: Some("Architecture".into()),
            })
        );
    }

    #[test]
    fn image_without_alt_has_no_caption() {
        let Some(Block::MediaRef { caption, .. }) = standalone_media("![](a.png)") else {
            panic!("expected media");
        };
        assert!(caption.is_none());
    }

    #[test]
    fn local_pdf_link_becomes_file() {
        assert_eq!(
            standalone_media("[Data sheet](../assets/datasheet.pdf)"),
            Some(Block::MediaRef {
                kind: MediaKind::File,
                locator: "../assets/datasheet.pdf".into(),
                caption: Some("Data sheet".into()),
            })
        );
    }

    #[test]
    fn remote_or_non_attachment_links_are_not_media() {
        assert!(standalone_media("[Sheet](https://example.com/datasheet.pdf)").is_none());
        assert!(standalone_media("[Guide](./guide.md)").is_none());
        assert!(standalone_media("text with ![img](a.png) inside").is_none());
    }
}
