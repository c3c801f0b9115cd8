/// Pipe table row syntax.
pub struct TableRow;

impl TableRow {
    pub const PIPE: char = '|';

    pub fn is_row(line: &str) -> bool {
        let t = line.trim();
        t.len() > 1 && t.starts_with(Self::PIPE) && t[1..].contains(Self::PIPE)
    }

    /// Splits a row into trimmed cells. Outer pipes are optional and `\|`
    /// stays inside its cell as a literal pipe.
    pub fn cells(line: &str) -> Vec<String> {
        let t = line.trim();
        let t = t.strip_prefix(Self::PIPE).unwrap_or(t);
        let t = match t.strip_suffix(Self::PIPE) {
            Some(inner) if !inner.ends_with('\\') => inner,
            _ => t,
        };

        let mut cells = Vec::new();
        let mut current = String::new();
        let mut chars = t.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&Self::PIPE) => {
                    current.push(Self::PIPE);
                    chars.next();
                }
                Self::PIPE => cells.push(std::mem::take(&mut current).trim().to_string()),
                _ => current.push(c),
            }
        }
        cells.push(current.trim().to_string());
        cells
    }

    /// The `|---|:---:|` alignment row under the header.
    pub fn is_delimiter_row(line: &str) -> bool {
        let cells = Self::cells(line);
        !cells.is_empty()
            && cells.iter().all(|c| {
                let c = c.trim();
                let c = c.strip_prefix(':').unwrap_or(c);
                let c = c.strip_suffix(':').unwrap_or(c);
                !c.is_empty() && c.chars().all(|ch| ch == '-')
            })
    }
}
