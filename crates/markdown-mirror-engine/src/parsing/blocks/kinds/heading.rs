/// ATX heading (`#` .. `######`).
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_SOURCE_LEVEL: usize = 6;

    /// Returns the source level and the heading text with any closing `#`
    /// sequence removed.
    pub fn parse(line: &str) -> Option<(usize, &str)> {
        let t = line.trim_start();
        let level = t.chars().take_while(|&c| c == Self::MARKER).count();
        if level == 0 || level > Self::MAX_SOURCE_LEVEL {
            return None;
        }
        let rest = &t[level..];
        if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
            return None;
        }
        let text = rest.trim();
        let closing = text.trim_end_matches(Self::MARKER);
        let text = if closing.is_empty() || closing.ends_with(' ') {
            closing.trim_end()
        } else {
            text
        };
        Some((level, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels() {
        assert_eq!(Heading::parse("# Title"), Some((1, "Title")));
        assert_eq!(Heading::parse("### Deep"), Some((3, "Deep")));
        assert_eq!(Heading::parse("###### Six"), Some((6, "Six")));
    }

    #[test]
    fn strips_closing_sequence() {
        assert_eq!(Heading::parse("## Title ##"), Some((2, "Title")));
        assert_eq!(Heading::parse("## C#"), Some((2, "C#")));
    }

    #[test]
    fn rejects_non_headings() {
        assert_eq!(Heading::parse("#hashtag"), None);
        assert_eq!(Heading::parse("####### seven"), None);
        assert_eq!(Heading::parse("plain"), None);
    }
}
