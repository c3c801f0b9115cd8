/// Thematic break: three or more `-`, `*` or `_`, optionally spaced.
pub struct ThematicBreak;

impl ThematicBreak {
    pub fn is_rule(line: &str) -> bool {
        let t = line.trim();
        let Some(marker) = t.chars().next() else {
            return false;
        };
        if !matches!(marker, '-' | '*' | '_') {
            return false;
        }
        let mut count = 0;
        for c in t.chars() {
            if c == marker {
                count += 1;
            } else if c != ' ' && c != '\t' {
                return false;
            }
        }
        count >= 3
    }
}
