#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    fn marker(self) -> char {
        match self {
            FenceKind::Backticks => '`',
            FenceKind::Tildes => '~',
        }
    }
}

/// The fence that opened a code block: which character, and how many.
///
/// Only a line made of exactly the same marker run closes the block, so a
/// four-backtick fence can carry literal triple-backtick lines in its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceSig {
    pub kind: FenceKind,
    pub len: usize,
}

/// Parsed opener line: the fence plus the info string after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen<'a> {
    pub sig: FenceSig,
    pub info: &'a str,
}

pub struct CodeFence;

impl CodeFence {
    pub const MIN_LEN: usize = 3;

    pub fn open(line: &str) -> Option<FenceOpen<'_>> {
        let t = line.trim_start();
        let kind = match t.chars().next()? {
            '`' => FenceKind::Backticks,
            '~' => FenceKind::Tildes,
            _ => return None,
        };
        let len = t.chars().take_while(|&c| c == kind.marker()).count();
        if len < Self::MIN_LEN {
            return None;
        }
        let info = t[len..].trim();
        // A backtick in the info string means this is inline code, not a fence.
        if kind == FenceKind::Backticks && info.contains('`') {
            return None;
        }
        Some(FenceOpen {
            sig: FenceSig { kind, len },
            info,
        })
    }

    pub fn closes(sig: FenceSig, line: &str) -> bool {
        let t = line.trim();
        t.len() == sig.len && t.chars().all(|c| c == sig.kind.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_backtick_fence() {
        let open = CodeFence::open("```rust").unwrap();
        assert_eq!(
            open.sig,
            FenceSig {
                kind: FenceKind::Backticks,
                len: 3
            }
        );
        assert_eq!(open.info, "rust");
    }

    #[test]
    fn detect_tilde_fence() {
        assert_eq!(CodeFence::open("~~~").unwrap().sig.kind, FenceKind::Tildes);
    }

    #[test]
    fn no_fence() {
        assert!(CodeFence::open("hello").is_none());
        assert!(CodeFence::open("``not a fence").is_none());
        assert!(CodeFence::open("```inline``` code").is_none());
    }

    #[test]
    fn closes_only_with_same_length() {
        let four = CodeFence::open("````markdown").unwrap().sig;
        assert!(!CodeFence::closes(four, "```"));
        assert!(CodeFence::closes(four, "````"));
        assert!(!CodeFence::closes(four, "`````"));
    }

    #[test]
    fn does_not_close_mismatched_fence() {
        let ticks = CodeFence::open("```").unwrap().sig;
        assert!(!CodeFence::closes(ticks, "~~~"));
        assert!(!CodeFence::closes(ticks, "```rust"));
    }
}
