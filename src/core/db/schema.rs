/// Schema Introspection Module
///
/// Catalog queries used by the session. Nothing here is cached: every
/// structural operation asks the engine again.

use crate::core::{EditorError, Result};
use rusqlite::{Connection, Row};

/// A column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Ordinal position, starting at 0
    pub cid: i64,
    /// Column name
    pub name: String,
    /// Declared type, empty when the column was declared without one
    pub type_name: String,
    /// Whether the column is declared NOT NULL
    pub notnull: bool,
    /// Default value expression (if any)
    pub dflt_value: Option<String>,
    /// 1-based position within the primary key, 0 if not part of it
    pub pk: i64,
}

impl ColumnInfo {
    fn from_pragma_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ColumnInfo {
            cid: row.get(0)?,
            name: row.get(1)?,
            type_name: row.get(2)?,
            notnull: row.get(3)?,
            dflt_value: row.get(4)?,
            pk: row.get(5)?,
        })
    }

    /// Builds a bare descriptor with only a name and declared type.
    pub fn new(cid: i64, name: &str, type_name: &str) -> Self {
        ColumnInfo {
            cid,
            name: name.to_string(),
            type_name: type_name.to_string(),
            notnull: false,
            dflt_value: None,
            pk: 0,
        }
    }
}

/// Lists user tables in the order the catalog returns them.
///
/// Internal `sqlite_*` tables are left out.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Returns the columns of `table` in declaration order.
///
/// # Errors
///
/// Returns `EditorError::Schema` if the table does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", dflt_value, pk
         FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([table], |row| ColumnInfo::from_pragma_row(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(EditorError::Schema(format!("no such table: {}", table)));
    }
    Ok(columns)
}
