/// Query Execution Module
///
/// Runs statements against a connection and collects rows as raw engine
/// values. Formatting for display lives here too so every view shows
/// values the same way.

use crate::core::{EditorError, Result};
use rusqlite::{params_from_iter, types::ValueRef, Batch, Connection, Statement};
use tracing::debug;

pub use rusqlite::types::Value;

/// Rows returned by a statement, with their column names.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of raw values, one entry per column
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }
}

/// What a raw statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The statement yields columns (SELECT, PRAGMA queries, EXPLAIN, ...)
    Rows(QueryResult),
    /// The statement changed the database; carries the affected row count
    Changed(usize),
}

/// Executes a statement that does not return rows.
pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<usize> {
    debug!(sql, params = params.len(), "execute");
    let changed = conn.execute(sql, params_from_iter(params.iter()))?;
    Ok(changed)
}

/// Executes a statement and collects every row it returns.
pub fn query(conn: &Connection, sql: &str, params: &[Value]) -> Result<QueryResult> {
    debug!(sql, params = params.len(), "query");
    let mut stmt = conn.prepare(sql)?;
    collect_rows(&mut stmt, params)
}

/// Executes user-supplied statement text.
///
/// The engine decides what kind of statement it is: anything that yields
/// columns is read back as rows, anything else is executed for its effect.
///
/// # Errors
///
/// Text holding more than one statement is rejected before anything runs
/// (`EditorError::Query`). A trailing `;`, whitespace or comments do not
/// count as a statement.
pub fn run(conn: &Connection, sql: &str) -> Result<Outcome> {
    debug!(sql, "run");
    let mut batch = Batch::new(conn, sql);
    let mut stmt = batch
        .next()?
        .ok_or_else(|| EditorError::Input("Please enter a SQL query".to_string()))?;
    if !matches!(batch.next(), Ok(None)) {
        return Err(EditorError::Query(
            "You can only execute one statement at a time".to_string(),
        ));
    }

    if stmt.column_count() > 0 {
        return Ok(Outcome::Rows(collect_rows(&mut stmt, &[])?));
    }
    let changed = stmt.execute([])?;
    Ok(Outcome::Changed(changed))
}

fn collect_rows(stmt: &mut Statement<'_>, params: &[Value]) -> Result<QueryResult> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = columns.len();

    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(QueryResult::new(columns, rows))
}

/// Formats a SQLite value for display
///
/// # Returns
///
/// A string representation of the value suitable for display.
pub fn format_value(value: &Value) -> String {
    match ValueRef::from(value) {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EditorError;
    use rusqlite::Connection;

    fn setup_test_table(conn: &Connection) {
        conn.execute_batch(
            "
            CREATE TABLE test (
                id INTEGER PRIMARY KEY,
                name TEXT,
                value REAL,
                active BOOLEAN DEFAULT 1
            );
            INSERT INTO test (name, value) VALUES ('Alice', 123.45);
            INSERT INTO test (name, value) VALUES ('Bob', 678.90);
            INSERT INTO test (name, value) VALUES (NULL, NULL);
        ",
        )
        .unwrap();
    }

    #[test]
    fn test_query_execution() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let result = query(&conn, "SELECT * FROM test ORDER BY id", &[]).unwrap();

        assert_eq!(result.columns, vec!["id", "name", "value", "active"]);
        assert_eq!(result.row_count, 3);
        assert_eq!(
            result.rows[0],
            vec![
                Value::Integer(1),
                Value::Text("Alice".into()),
                Value::Real(123.45),
                Value::Integer(1)
            ]
        );
        assert_eq!(result.rows[2][1], Value::Null);
    }

    #[test]
    fn test_parameterized_query() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let result = query(
            &conn,
            "SELECT name FROM test WHERE id = ?",
            &[Value::Integer(2)],
        )
        .unwrap();
        assert_eq!(result.rows, vec![vec![Value::Text("Bob".into())]]);
    }

    #[test]
    fn test_execute_reports_changes() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let changed = execute(
            &conn,
            "UPDATE test SET active = ? WHERE value IS NOT NULL",
            &[Value::Integer(0)],
        )
        .unwrap();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_query_error_handling() {
        let conn = Connection::open_in_memory().unwrap();

        let result = query(&conn, "SELECT * FROM nonexistent_table", &[]);
        match result.unwrap_err() {
            EditorError::Database(e) => assert!(e.to_string().contains("no such table")),
            other => panic!("Expected Database error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_classifies_by_columns() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        match run(&conn, "  select name from test where id = 1").unwrap() {
            Outcome::Rows(result) => assert_eq!(result.columns, vec!["name"]),
            other => panic!("Expected rows, got {:?}", other),
        }

        // PRAGMA queries and CTEs return rows too
        assert!(matches!(
            run(&conn, "PRAGMA table_info(test)").unwrap(),
            Outcome::Rows(_)
        ));
        assert!(matches!(
            run(&conn, "WITH x AS (SELECT 1) SELECT * FROM x").unwrap(),
            Outcome::Rows(_)
        ));

        assert_eq!(
            run(&conn, "DELETE FROM test WHERE name IS NULL").unwrap(),
            Outcome::Changed(1)
        );
        assert_eq!(
            run(&conn, "CREATE TABLE other (x)").unwrap(),
            Outcome::Changed(0)
        );
    }

    #[test]
    fn test_run_rejects_multiple_statements() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        for sql in [
            "CREATE TABLE a (x); CREATE TABLE b (y)",
            "SELECT 1; DROP TABLE test",
            "CREATE TABLE a (x); INSERT INTO a VALUES (1)",
        ] {
            match run(&conn, sql) {
                Err(EditorError::Query(msg)) => assert!(msg.contains("one statement")),
                other => panic!("Expected Query error for {:?}, got {:?}", sql, other),
            }
        }

        // Nothing ran
        let tables = query(&conn, "SELECT name FROM sqlite_master WHERE type = 'table'", &[])
            .unwrap();
        assert_eq!(tables.rows, vec![vec![Value::Text("test".into())]]);
    }

    #[test]
    fn test_run_ignores_trailing_separators() {
        let conn = Connection::open_in_memory().unwrap();

        match run(&conn, "SELECT 1;").unwrap() {
            Outcome::Rows(result) => assert_eq!(result.rows, vec![vec![Value::Integer(1)]]),
            other => panic!("Expected rows, got {:?}", other),
        }
        assert_eq!(
            run(&conn, "CREATE TABLE t (x);  ;\n-- done\n").unwrap(),
            Outcome::Changed(0)
        );
        assert!(matches!(
            run(&conn, "-- only a comment"),
            Err(EditorError::Input(_))
        ));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "NULL");
        assert_eq!(format_value(&Value::Integer(42)), "42");
        assert_eq!(format_value(&Value::Real(1.5)), "1.5");
        assert_eq!(format_value(&Value::Text("héllo".into())), "héllo");
        assert_eq!(
            format_value(&Value::Blob(b"Hello".to_vec())),
            "<BLOB: 5 bytes>"
        );
    }
}
