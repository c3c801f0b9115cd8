//! Front-matter and title extraction for one source file.

use serde::Deserialize;

use crate::parsing::blocks::kinds::Heading;

const DELIMITER: &str = "---";

/// A source file split into its title candidates and convertible body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSource {
    pub frontmatter_title: Option<String>,
    pub first_heading: Option<String>,
    /// Content with front matter removed, and with the leading level-1
    /// heading removed when it serves as the page title.
    pub body: String,
}

impl ParsedSource {
    /// Front-matter title, then first heading, then `fallback`.
    pub fn title_or(&self, fallback: &str) -> String {
        self.frontmatter_title
            .clone()
            .or_else(|| self.first_heading.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// The front-matter keys this crate reads. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
}

pub fn parse_source(raw: &str) -> ParsedSource {
    let (frontmatter, body) = split_frontmatter(raw);
    let frontmatter_title = frontmatter
        .map(parse_frontmatter)
        .and_then(|fm| fm.title)
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty());

    let mut first_heading = None;
    let mut body = body.to_string();
    if let Some((heading, rest)) = leading_h1(&body) {
        first_heading = Some(heading.to_string());
        if frontmatter_title.is_none() {
            body = rest.to_string();
        }
    }

    ParsedSource {
        frontmatter_title,
        first_heading,
        body,
    }
}

/// Returns `(front matter, body)`; the front matter must open on the first line.
fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(first_end) = raw.find('\n') else {
        return (None, raw);
    };
    if raw[..first_end].trim_end() != DELIMITER {
        return (None, raw);
    }

    let mut offset = first_end + 1;
    for line in raw[offset..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let fm = &raw[first_end + 1..offset];
            return (Some(fm), &raw[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, raw)
}

fn parse_frontmatter(yaml: &str) -> FrontMatter {
    if yaml.trim().is_empty() {
        return FrontMatter::default();
    }
    serde_yaml::from_str(yaml).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed front matter: {e}");
        FrontMatter::default()
    })
}

/// The first non-blank line, if it is a level-1 heading, plus the text after it.
fn leading_h1(body: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim().is_empty() {
            offset += line.len();
            continue;
        }
        return match Heading::parse(line.trim_end()) {
            Some((1, text)) if !text.is_empty() => Some((text, &body[offset + line.len()..])),
            _ => None,
        };
    }
    None
}
