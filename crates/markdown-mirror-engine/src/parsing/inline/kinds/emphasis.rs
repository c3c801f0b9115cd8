use std::sync::OnceLock;

use regex::Regex;

/// `**strong**` or `__strong__`.
pub struct Bold;

impl Bold {
    pub fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"(?s)\*\*(.+?)\*\*|__(.+?)__").expect("Invalid bold regex"))
    }
}

/// `*emphasis*` or `_emphasis_`.
///
/// The inner text may not start or end with whitespace. Underscore emphasis
/// additionally requires non-alphanumeric neighbours so `snake_case_names`
/// stay literal.
pub struct Italic;

impl Italic {
    pub const UNDERSCORE: char = '_';

    pub fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r"(?s)\*([^*\s](?:[^*]*[^*\s])?)\*|_([^_\s](?:[^_]*[^_\s])?)_")
                .expect("Invalid italic regex")
        })
    }

    /// Rejects intraword underscore matches such as the `_b_` in `a_b_c`.
    pub fn has_word_boundaries(text: &str, start: usize, end: usize) -> bool {
        if !text[start..].starts_with(Self::UNDERSCORE) {
            return true;
        }
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    }
}

/// `~~struck~~`.
pub struct Strikethrough;

impl Strikethrough {
    pub fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"(?s)~~(.+?)~~").expect("Invalid strikethrough regex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_inside_word_is_not_emphasis() {
        let text = "snake_case_name";
        let m = Italic::pattern().find(text).unwrap();
        assert!(!Italic::has_word_boundaries(text, m.start(), m.end()));
    }

    #[test]
    fn underscore_between_spaces_is_emphasis() {
        let text = "an _emphasised_ word";
        let m = Italic::pattern().find(text).unwrap();
        assert!(Italic::has_word_boundaries(text, m.start(), m.end()));
    }

    #[test]
    fn asterisk_emphasis_needs_no_boundaries() {
        let text = "un*frigging*believable";
        let m = Italic::pattern().find(text).unwrap();
        assert!(Italic::has_word_boundaries(text, m.start(), m.end()));
    }
}
