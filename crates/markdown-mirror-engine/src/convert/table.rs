use crate::models::{Block, RichText};
use crate::parsing::{blocks::kinds::TableRow, inline::parse_rich_text};

/// Builds a rectangular table from a table section's lines.
///
/// The first row is the header and fixes the width. The second row must be
/// the alignment marker and is dropped. Data rows are right-padded with empty
/// cells or truncated to the header width.
pub fn convert_table(lines: &[String]) -> Result<Block, &'static str> {
    let mut rows = lines.iter().filter(|l| !l.trim().is_empty());
    let header = TableRow::cells(rows.next().ok_or("table has no rows")?);
    let delimiter = rows.next().ok_or("table has no delimiter row")?;
    if !TableRow::is_delimiter_row(delimiter) {
        return Err("second table row is not an alignment row");
    }

    let width = header.len();
    let mut out: Vec<Vec<RichText>> = vec![cells_to_rich_text(header)];
    for line in rows {
        let mut cells = TableRow::cells(line);
        cells.truncate(width);
        cells.resize(width, String::new());
        out.push(cells_to_rich_text(cells));
    }

    Ok(Block::Table { width, rows: out })
}

fn cells_to_rich_text(cells: Vec<String>) -> Vec<RichText> {
    cells.iter().map(|c| parse_rich_text(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &str) -> Vec<String> {
        s.lines().map(str::to_string).collect()
    }

    fn widths(block: &Block) -> Vec<usize> {
        match block {
            Block::Table { rows, .. } => rows.iter().map(Vec::len).collect(),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn short_row_is_padded() {
        let block = convert_table(&lines("| a | b | c |\n|---|---|---|\n| 1 | 2 |")).unwrap();
        let Block::Table { width, rows } = &block else {
            panic!("expected table");
        };
        assert_eq!(*width, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1][0].plain_text(), "1");
        assert_eq!(rows[1][2].plain_text(), "");
    }

    #[test]
    fn long_row_is_truncated() {
        let block = convert_table(&lines("| a | b |\n|---|---|\n| 1 | 2 | 3 | 4 |")).unwrap();
        assert_eq!(widths(&block), vec![2, 2]);
    }

    #[test]
    fn every_row_matches_header_width() {
        let block = convert_table(&lines(
            "| h1 | h2 | h3 | h4 |\n|:--|:-:|--:|---|\n| a |\n| a | b | c | d | e |\n||||\n",
        ))
        .unwrap();
        assert!(widths(&block).iter().all(|&w| w == 4));
    }

    #[test]
    fn cells_get_inline_formatting() {
        let block = convert_table(&lines("| **Name** |\n|---|\n| `x` |")).unwrap();
        let Block::Table { rows, .. } = block else {
            panic!("expected table");
        };
        assert!(rows[0][0].spans()[0].annotations.bold);
        assert!(rows[1][0].spans()[0].annotations.code);
    }

    #[test]
    fn missing_alignment_row_is_rejected() {
        assert!(convert_table(&lines("| a | b |\n| 1 | 2 |")).is_err());
        assert!(convert_table(&lines("| a | b |")).is_err());
    }
}
