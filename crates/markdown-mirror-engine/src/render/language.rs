/// Code languages the destination accepts verbatim.
const SUPPORTED: &[&str] = &[
    "abap", "arduino", "bash", "basic", "c", "c#", "c++", "clojure", "coffeescript", "css",
    "dart", "diff", "docker", "elixir", "elm", "erlang", "f#", "flow", "fortran", "gherkin",
    "glsl", "go", "graphql", "groovy", "haskell", "html", "java", "javascript", "json", "julia",
    "kotlin", "latex", "less", "lisp", "livescript", "lua", "makefile", "markdown", "markup",
    "matlab", "mermaid", "nix", "objective-c", "ocaml", "pascal", "perl", "php", "plain text",
    "powershell", "prolog", "protobuf", "python", "r", "reason", "ruby", "rust", "sass",
    "scala", "scheme", "scss", "shell", "sql", "swift", "typescript", "vb.net", "verilog",
    "vhdl", "visual basic", "webassembly", "xml", "yaml",
];

const ALIASES: &[(&str, &str)] = &[
    ("cpp", "c++"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("dockerfile", "docker"),
    ("fsharp", "f#"),
    ("golang", "go"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("jsonc", "json"),
    ("kt", "kotlin"),
    ("make", "makefile"),
    ("md", "markdown"),
    ("mdx", "markdown"),
    ("objc", "objective-c"),
    ("plantuml", "plain text"),
    ("proto", "protobuf"),
    ("ps1", "powershell"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("console", "shell"),
    ("tex", "latex"),
    ("text", "plain text"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("txt", "plain text"),
    ("wasm", "webassembly"),
    ("yml", "yaml"),
    ("zsh", "shell"),
];

pub const FALLBACK_LANGUAGE: &str = "plain text";

/// Map a fence language tag onto the destination's language set.
pub fn normalize_language(language: &str) -> &'static str {
    let language = language.trim().to_ascii_lowercase();
    if let Some(found) = SUPPORTED.iter().find(|l| **l == language) {
        return found;
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == language)
        .map(|(_, target)| *target)
        .unwrap_or(FALLBACK_LANGUAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rust", "rust")]
    #[case("Rust", "rust")]
    #[case("rs", "rust")]
    #[case("yml", "yaml")]
    #[case("c++", "c++")]
    #[case("", "plain text")]
    #[case("brainfuck", "plain text")]
    fn maps_languages(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_language(input), expected);
    }
}
