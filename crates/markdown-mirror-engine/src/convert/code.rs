use std::sync::OnceLock;

use regex::Regex;

/// Splits a fence info string into `(language, caption)`.
///
/// The first token is the language unless it is itself a `key=value` pair.
/// A `title="..."` or `filename="..."` key becomes the caption; any other
/// metadata is used verbatim as the caption.
pub fn parse_info(info: &str) -> (String, Option<String>) {
    let info = info.trim();
    let (language, meta) = match info.split_once(char::is_whitespace) {
        Some((first, rest)) if !first.contains('=') => (first, rest.trim()),
        None if !info.contains('=') => (info, ""),
        _ => ("", info),
    };
    let language = language
        .trim_start_matches('{')
        .trim_start_matches('.')
        .to_ascii_lowercase();

    if meta.is_empty() {
        return (language, None);
    }
    let caption = caption_key()
        .captures(meta)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map_or_else(|| meta.to_string(), |m| m.as_str().to_string());
    (language, Some(caption))
}

fn caption_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\b(?:title|filename)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("Invalid caption regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "", None)]
    #[case("rust", "rust", None)]
    #[case("Python", "python", None)]
    #[case(r#"rust title="main.rs""#, "rust", Some("main.rs"))]
    #[case(r#"js filename='app.js' showLineNumbers"#, "js", Some("app.js"))]
    #[case("bash {1,3}", "bash", Some("{1,3}"))]
    #[case(r#"title="Only a title""#, "", Some("Only a title"))]
    fn parses_info_strings(
        #[case] info: &str,
        #[case] language: &str,
        #[case] caption: Option<&str>,
    ) {
        let (lang, cap) = parse_info(info);
        assert_eq!(lang, language);
        assert_eq!(cap.as_deref(), caption);
    }
}
