use std::sync::OnceLock;

use regex::Regex;

/// Code span inline type.
///
/// Code spans are raw zones: lower-precedence emphasis never matches inside
/// them because any overlapping candidate is discarded.
pub struct CodeSpan;

impl CodeSpan {
    /// The backtick character that delimits code spans.
    pub const TICK: char = '`';

    pub fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("Invalid code span regex"))
    }
}
