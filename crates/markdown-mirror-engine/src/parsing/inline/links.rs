//! Link target validation.
//!
//! The destination resolves links on its own, so only targets that mean the
//! same thing there survive: absolute URLs with an allowed scheme, and bare
//! `domain.tld` strings (promoted to `https://`). Anchors, relative paths,
//! root-relative paths and `file://` URLs are rejected.

use std::sync::OnceLock;

use regex::Regex;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "ftp"];

/// Extensions that make a dotted string a file name rather than a host.
const FILE_EXTENSIONS: &[&str] = &[
    "md", "mdx", "markdown", "html", "htm", "txt", "json", "yaml", "yml", "toml", "png", "jpg",
    "jpeg", "gif", "svg", "webp", "pdf", "zip", "csv", "rs", "js", "ts", "py",
];

/// Returns the destination-safe form of `raw`, or `None` when it cannot be
/// resolved outside the source corpus.
pub fn normalize_link_target(raw: &str) -> Option<String> {
    let target = raw.trim();
    if target.is_empty()
        || target.starts_with('#')
        || target.starts_with("./")
        || target.starts_with("../")
        || target.starts_with('/')
    {
        return None;
    }

    if let Some(scheme) = scheme_of(target) {
        let scheme = scheme.to_ascii_lowercase();
        return ALLOWED_SCHEMES
            .contains(&scheme.as_str())
            .then(|| target.to_string());
    }

    looks_like_domain(target).then(|| format!("https://{target}"))
}

/// True when `target` is an absolute URL that needs no further resolution.
pub fn is_absolute_url(target: &str) -> bool {
    scheme_of(target).is_some_and(|s| {
        let s = s.to_ascii_lowercase();
        s == "http" || s == "https"
    })
}

fn scheme_of(target: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("Invalid scheme regex")
    });
    let scheme = re.captures(target)?.get(1)?.as_str();
    // `localhost:8080/x` and `example.com:443` are hosts with ports, not schemes.
    if scheme.contains('.') || target[scheme.len() + 1..].starts_with(|c: char| c.is_ascii_digit())
    {
        return None;
    }
    Some(scheme)
}

fn looks_like_domain(target: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+([A-Za-z]{2,24})(?::\d+)?$")
            .expect("Invalid domain regex")
    });
    let host = target
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let Some(caps) = re.captures(host) else {
        return false;
    };
    let tld = caps[1].to_ascii_lowercase();
    !FILE_EXTENSIONS.contains(&tld.as_str())
}
