use crate::models::ListKind;

/// A parsed list-item marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker<'a> {
    pub kind: ListKind,
    /// Set for task items only.
    pub checked: Option<bool>,
    /// Leading whitespace width (informational; nesting is not modelled).
    pub indent: usize,
    pub content: &'a str,
}

impl<'a> ListMarker<'a> {
    pub const BULLETS: [char; 3] = ['-', '*', '+'];

    pub fn parse(line: &'a str) -> Option<Self> {
        let indent = line.len() - line.trim_start().len();
        let t = line.trim_start();

        if let Some(rest) = t.strip_prefix(Self::BULLETS) {
            if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
                return None;
            }
            let rest = rest.trim_start();
            if let Some((checked, content)) = Self::task_box(rest) {
                return Some(Self {
                    kind: ListKind::Task,
                    checked: Some(checked),
                    indent,
                    content,
                });
            }
            return Some(Self {
                kind: ListKind::Bullet,
                checked: None,
                indent,
                content: rest,
            });
        }

        let digits = t.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 || digits > 9 {
            return None;
        }
        let rest = t[digits..].strip_prefix(['.', ')'])?;
        if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
            return None;
        }
        Some(Self {
            kind: ListKind::Numbered,
            checked: None,
            indent,
            content: rest.trim_start(),
        })
    }

    fn task_box(rest: &str) -> Option<(bool, &str)> {
        let checked = match rest.get(..3)? {
            "[ ]" => false,
            "[x]" | "[X]" => true,
            _ => return None,
        };
        let after = &rest[3..];
        if !(after.is_empty() || after.starts_with([' ', '\t'])) {
            return None;
        }
        Some((checked, after.trim_start()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_items() {
        let m = ListMarker::parse("- item").unwrap();
        assert_eq!(m.kind, ListKind::Bullet);
        assert_eq!(m.content, "item");
        assert_eq!(ListMarker::parse("  * nested").unwrap().indent, 2);
    }

    #[test]
    fn numbered_items() {
        let m = ListMarker::parse("12. twelfth").unwrap();
        assert_eq!(m.kind, ListKind::Numbered);
        assert_eq!(m.content, "twelfth");
        assert_eq!(ListMarker::parse("3) third").unwrap().content, "third");
    }

    #[test]
    fn task_items() {
        let open = ListMarker::parse("- [ ] todo").unwrap();
        assert_eq!((open.kind, open.checked), (ListKind::Task, Some(false)));
        let done = ListMarker::parse("* [x] done").unwrap();
        assert_eq!((done.checked, done.content), (Some(true), "done"));
    }

    #[test]
    fn not_list_items() {
        assert!(ListMarker::parse("-dash").is_none());
        assert!(ListMarker::parse("1.5 million").is_none());
        assert!(ListMarker::parse("**bold**").is_none());
        assert!(ListMarker::parse("plain").is_none());
    }
}
