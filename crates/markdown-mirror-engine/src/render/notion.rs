use serde_json::{Map, Value, json};

use crate::models::{Block, ListKind, MediaKind, RichText, TextSpan};
use crate::parsing::inline::is_absolute_url;

use super::Renderer;
use super::language::normalize_language;

/// Longest text the destination accepts in one rich-text element.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Renders blocks into Notion's block-object JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotionRenderer;

impl NotionRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn rich_text(&self, text: &RichText) -> Value {
        Value::Array(text.spans().iter().flat_map(render_span).collect())
    }

    fn plain(&self, text: &str) -> Value {
        self.rich_text(&RichText::plain(text))
    }
}

fn render_span(span: &TextSpan) -> Vec<Value> {
    let link = span.link.as_ref().map(|url| json!({ "url": url }));
    let a = &span.annotations;
    let annotations = json!({
        "bold": a.bold,
        "italic": a.italic,
        "strikethrough": a.strikethrough,
        "underline": false,
        "code": a.code,
        "color": "default",
    });
    chunk_chars(&span.content, MAX_TEXT_CHARS)
        .into_iter()
        .map(|chunk| {
            json!({
                "type": "text",
                "text": { "content": chunk, "link": link },
                "annotations": annotations,
            })
        })
        .collect()
}

/// Split on char boundaries into pieces of at most `max` chars.
fn chunk_chars(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

fn block(kind: &str, body: Value) -> Value {
    let mut object = Map::new();
    object.insert("object".to_string(), json!("block"));
    object.insert("type".to_string(), json!(kind));
    object.insert(kind.to_string(), body);
    Value::Object(object)
}

impl Renderer for NotionRenderer {
    type Output = Value;

    fn render_block(&self, b: &Block) -> Value {
        match b {
            Block::Heading { level, text } => {
                let kind = format!("heading_{}", (*level).clamp(1, Block::MAX_HEADING_LEVEL));
                block(&kind, json!({ "rich_text": self.rich_text(text) }))
            }
            Block::Paragraph { text } => {
                block("paragraph", json!({ "rich_text": self.rich_text(text) }))
            }
            Block::ListItem {
                kind,
                checked,
                text,
            } => match kind {
                ListKind::Bullet => block(
                    "bulleted_list_item",
                    json!({ "rich_text": self.rich_text(text) }),
                ),
                ListKind::Numbered => block(
                    "numbered_list_item",
                    json!({ "rich_text": self.rich_text(text) }),
                ),
                ListKind::Task => block(
                    "to_do",
                    json!({
                        "rich_text": self.rich_text(text),
                        "checked": checked.unwrap_or(false),
                    }),
                ),
            },
            Block::Table { width, rows } => {
                let children: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        let cells: Vec<Value> =
                            row.iter().map(|cell| self.rich_text(cell)).collect();
                        block("table_row", json!({ "cells": cells }))
                    })
                    .collect();
                block(
                    "table",
                    json!({
                        "table_width": width,
                        "has_column_header": true,
                        "has_row_header": false,
                        "children": children,
                    }),
                )
            }
            Block::CodeBlock {
                language,
                code,
                caption,
            } => {
                let mut body = json!({
                    "rich_text": self.plain(code),
                    "language": normalize_language(language),
                });
                if let Some(caption) = caption {
                    body["caption"] = self.plain(caption);
                }
                block("code", body)
            }
            Block::Quote { text } => block("quote", json!({ "rich_text": self.rich_text(text) })),
            Block::Divider => block("divider", json!({})),
            Block::MediaRef {
                kind,
                locator,
                caption,
            } => {
                let kind = match kind {
                    MediaKind::Image => "image",
                    MediaKind::File => "file",
                };
                let mut body = if is_absolute_url(locator) {
                    json!({ "type": "external", "external": { "url": locator } })
                } else {
                    json!({ "type": "file_upload", "file_upload": { "id": locator } })
                };
                if let Some(caption) = caption {
                    body["caption"] = self.plain(caption);
                }
                block(kind, body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Annotations, RichText};
    use crate::parsing::inline::parse_rich_text;
    use crate::parsing::rope::Span;
    use pretty_assertions::assert_eq;

    fn text_item(content: &str, bold: bool, link: Option<&str>) -> Value {
        json!({
            "type": "text",
            "text": { "content": content, "link": link.map(|url| json!({ "url": url })) },
            "annotations": {
                "bold": bold,
                "italic": false,
                "strikethrough": false,
                "underline": false,
                "code": false,
                "color": "default",
            },
        })
    }

    #[test]
    fn bold_link_renders_as_one_item() {
        let r = NotionRenderer::new();
        let out = r.render_block(&Block::paragraph(parse_rich_text(
            "see **[docs](https://example.com)**",
        )));
        assert_eq!(
            out,
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [
                        text_item("see ", false, None),
                        text_item("docs", true, Some("https://example.com")),
                    ]
                }
            })
        );
    }

    #[test]
    fn long_spans_are_chunked_on_char_boundaries() {
        let long = "é".repeat(MAX_TEXT_CHARS + 5);
        let span = TextSpan::annotated(long.clone(), Annotations::BOLD, Span::new(0, long.len()));
        let items = NotionRenderer::new().rich_text(&RichText(vec![span]));
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0]["text"]["content"].as_str().unwrap().chars().count(),
            MAX_TEXT_CHARS
        );
        assert_eq!(items[1]["text"]["content"], json!("ééééé"));
        assert_eq!(items[1]["annotations"]["bold"], json!(true));
    }

    #[test]
    fn task_item_is_to_do() {
        let out = NotionRenderer::new().render_block(&Block::ListItem {
            kind: ListKind::Task,
            checked: Some(true),
            text: RichText::plain("ship it"),
        });
        assert_eq!(out["type"], json!("to_do"));
        assert_eq!(out["to_do"]["checked"], json!(true));
    }

    #[test]
    fn table_rows_become_children() {
        let out = NotionRenderer::new().render_block(&Block::Table {
            width: 2,
            rows: vec![
                vec![RichText::plain("a"), RichText::plain("b")],
                vec![RichText::plain("1"), RichText::default()],
            ],
        });
        assert_eq!(out["table"]["table_width"], json!(2));
        let children = out["table"]["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1]["table_row"]["cells"][1], json!([]));
    }

    #[test]
    fn code_language_is_normalized_and_captioned() {
        let out = NotionRenderer::new().render_block(&Block::CodeBlock {
            language: "rs".to_string(),
            code: "fn main() {}".to_string(),
            caption: Some("main.rs".to_string()),
        });
        assert_eq!(out["code"]["language"], json!("rust"));
        assert_eq!(out["code"]["caption"][0]["text"]["content"], json!("main.rs"));
    }

    #[test]
    fn media_external_vs_uploaded() {
        let r = NotionRenderer::new();
        let external = r.render_block(&Block::MediaRef {
            kind: MediaKind::Image,
            locator: "https://example.com/a.png".to_string(),
            caption: None,
        });
        let uploaded = r.render_block(&Block::MediaRef {
            kind: MediaKind::File,
            locator: "upload-123".to_string(),
            caption: None,
        });
        assert_eq!(external["image"]["external"]["url"], json!("https://example.com/a.png"));
        assert_eq!(uploaded["file"]["file_upload"]["id"], json!("upload-123"));
    }

    #[test]
    fn heading_levels() {
        let out = NotionRenderer::new().render_block(&Block::Heading {
            level: 2,
            text: RichText::plain("Setup"),
        });
        assert_eq!(out["type"], json!("heading_2"));
    }
}
