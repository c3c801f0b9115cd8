use std::sync::OnceLock;

use regex::Regex;

/// `![alt](src "optional title")`.
pub struct Image;

impl Image {
    pub fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#)
                .expect("Invalid image regex")
        })
    }

    /// Matches only when the whole (trimmed) input is one image reference.
    pub fn whole() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"^!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)$"#)
                .expect("Invalid whole-image regex")
        })
    }
}

/// `[text](target "optional title")`.
pub struct Link;

impl Link {
    pub fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"\[([^\]]+)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#)
                .expect("Invalid link regex")
        })
    }

    /// Matches only when the whole input is one link.
    pub fn whole() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"^\[([^\]]+)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)$"#)
                .expect("Invalid whole-link regex")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_with_title() {
        let caps = Image::pattern()
            .captures(r#"![Logo](img/logo.png "The logo")"#)
            .unwrap();
        assert_eq!(&caps[1], "Logo");
        assert_eq!(&caps[2], "img/logo.png");
    }

    #[test]
    fn whole_link_rejects_surrounding_text() {
        assert!(Link::whole().is_match("[a](https://x.io)"));
        assert!(!Link::whole().is_match("see [a](https://x.io)"));
    }
}
