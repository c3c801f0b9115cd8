/// Turn a directory or file name into a page title.
///
/// Punctuation becomes word breaks and each word gets an initial capital:
/// `getting-started` becomes `Getting Started`.
pub fn format_segment_title(segment: &str) -> String {
    segment
        .split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '&'))
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
