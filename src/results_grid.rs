/// Results Grid Module for sqledit
///
/// The result set currently on screen: column headers, raw row values and
/// where the rows came from. Record operations read the raw values back out
/// of the grid, so they are kept exactly as the engine returned them.
use crate::core::db::{format_value, QueryResult, Value};

/// Where the rows of a grid came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GridSource {
    #[default]
    Empty,
    /// `SELECT *` of the named table
    Table(String),
    /// Rows of an ad-hoc statement
    Query(String),
}

/// Represents the entire grid structure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub source: GridSource,
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        ResultsGrid::default()
    }

    pub fn from_result(result: QueryResult, source: GridSource) -> Self {
        ResultsGrid {
            headers: result.columns,
            rows: result.rows,
            source,
        }
    }

    pub fn clear(&mut self) {
        *self = ResultsGrid::default();
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw values of the row at `index` (0-based).
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// True when the grid shows the full contents of `table`.
    pub fn shows_table(&self, table: &str) -> bool {
        matches!(&self.source, GridSource::Table(name) if name == table)
    }

    /// Renders the grid as an aligned text table.
    ///
    /// Rows are numbered from 1 in a leading `#` column; those numbers are
    /// what the user types to pick a record. Cells wider than `max_width`
    /// characters are cut and end in `…`.
    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let max_width = max_width.max(1);

        let mut table: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
        let mut header = vec!["#".to_string()];
        header.extend(self.headers.iter().map(|h| truncate(h, max_width)));
        table.push(header);
        for (i, row) in self.rows.iter().enumerate() {
            let mut line = vec![(i + 1).to_string()];
            line.extend(row.iter().map(|v| truncate(&format_value(v), max_width)));
            table.push(line);
        }

        let columns = self.headers.len() + 1;
        let mut widths = vec![0usize; columns];
        for line in &table {
            for (i, cell) in line.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut output = String::new();
        for (n, line) in table.iter().enumerate() {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect();
            output.push_str(cells.join(" | ").trim_end());
            output.push('\n');
            if n == 0 {
                let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                output.push_str(&underline.join("-+-"));
                output.push('\n');
            }
        }
        match self.rows.len() {
            1 => output.push_str("(1 row)\n"),
            n => output.push_str(&format!("({} rows)\n", n)),
        }
        output
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultsGrid {
        ResultsGrid::from_result(
            QueryResult::new(
                vec!["id".to_string(), "name".to_string()],
                vec![
                    vec![Value::Integer(1), Value::Text("Alice".into())],
                    vec![Value::Integer(2), Value::Null],
                ],
            ),
            GridSource::Table("users".to_string()),
        )
    }

    #[test]
    fn test_render_empty_grid() {
        let grid = ResultsGrid::new();
        assert!(grid.is_empty());
        assert_eq!(grid.render(40), "");
    }

    #[test]
    fn test_render_with_headers_and_rows() {
        insta::assert_snapshot!(sample().render(40), @r###"
        # | id | name
        --+----+------
        1 | 1  | Alice
        2 | 2  | NULL
        (2 rows)
        "###);
    }

    #[test]
    fn test_render_headers_only() {
        let grid = ResultsGrid::from_result(
            QueryResult::new(vec!["a".to_string()], vec![]),
            GridSource::Query("SELECT 1 AS a WHERE 0".to_string()),
        );
        let rendered = grid.render(40);
        assert!(rendered.starts_with("# | a\n"));
        assert!(rendered.ends_with("(0 rows)\n"));
    }

    #[test]
    fn test_render_truncates_wide_cells() {
        let grid = ResultsGrid::from_result(
            QueryResult::new(
                vec!["text".to_string()],
                vec![vec![Value::Text("abcdefghij".into())]],
            ),
            GridSource::Empty,
        );
        let rendered = grid.render(5);
        assert!(rendered.contains("abcd…"));
        assert!(!rendered.contains("abcde"));
        assert!(rendered.ends_with("(1 row)\n"));
    }

    #[test]
    fn test_row_access_and_source() {
        let mut grid = sample();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.row(1), Some(&[Value::Integer(2), Value::Null][..]));
        assert_eq!(grid.row(2), None);
        assert!(grid.shows_table("users"));
        assert!(!grid.shows_table("orders"));

        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.source, GridSource::Empty);
    }
}
