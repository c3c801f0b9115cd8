/// `> quoted` lines.
pub struct BlockQuote;

impl BlockQuote {
    pub const MARKER: char = '>';

    /// True when the line opens with a quote marker after indentation.
    pub fn is_quote(line: &str) -> bool {
        line.trim_start().starts_with(Self::MARKER)
    }

    /// Removes every leading marker (`>`, `>>`, `> >`) and the single space
    /// after each, returning the quoted text. Nesting depth is not kept.
    pub fn content(line: &str) -> &str {
        let mut rest = line;
        loop {
            let trimmed = rest.trim_start_matches(' ');
            match trimmed.strip_prefix(Self::MARKER) {
                Some(after) => rest = after.strip_prefix(' ').unwrap_or(after),
                None => return rest,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello", "hello")]
    #[case("> hello", "hello")]
    #[case("> > hello", "hello")]
    #[case(">> hello", "hello")]
    #[case("  >  indented", " indented")]
    #[case(">", "")]
    fn strips_markers(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(BlockQuote::content(line), expected);
    }

    #[test]
    fn detects_quotes() {
        assert!(BlockQuote::is_quote("   > x"));
        assert!(!BlockQuote::is_quote("a > b"));
    }
}
