//! SQL statement assembly.
//!
//! Every statement the session issues is built here. Identifiers are always
//! double-quoted; values are always bound as parameters. Declared types are
//! passed through as typed by the user, since SQLite accepts arbitrary type
//! names.

use crate::core::db::ColumnInfo;
use crate::core::{EditorError, Result};
use uuid::Uuid;

/// A (name, declared type) pair collected from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
}

impl FieldDef {
    pub fn new(name: &str, type_name: &str) -> Self {
        FieldDef {
            name: name.trim().to_string(),
            type_name: type_name.trim().to_string(),
        }
    }
}

/// Quotes an identifier for use in SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn field_definition(field: &FieldDef) -> String {
    if field.type_name.is_empty() {
        quote_ident(&field.name)
    } else {
        format!("{} {}", quote_ident(&field.name), field.type_name)
    }
}

pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", quote_ident(table))
}

/// `CREATE TABLE` for the given fields.
///
/// # Errors
///
/// Returns `EditorError::Input` when `fields` is empty.
pub fn create_table(table: &str, fields: &[FieldDef]) -> Result<String> {
    if fields.is_empty() {
        return Err(EditorError::Input(
            "No fields were added to the table".to_string(),
        ));
    }
    let defs: Vec<String> = fields.iter().map(field_definition).collect();
    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        defs.join(", ")
    ))
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {}", quote_ident(table))
}

pub fn add_column(table: &str, field: &FieldDef) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_ident(table),
        field_definition(field)
    )
}

/// `INSERT` naming every column, one placeholder per column.
pub fn insert(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list(columns),
        placeholders
    )
}

/// Matches a row by every column value. `IS` is used so NULL cells match.
fn where_all(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{} IS ?", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `UPDATE` setting every column, for rows equal to the original values.
///
/// Parameters are the new values followed by the original values. Rows are
/// not identified by key: every row identical to the original is updated.
pub fn update_matching(table: &str, columns: &[&str]) -> String {
    let set = columns
        .iter()
        .map(|c| format!("{} = ?", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {}",
        quote_ident(table),
        set,
        where_all(columns)
    )
}

/// `DELETE` of every row equal to the given values.
pub fn delete_matching(table: &str, columns: &[&str]) -> String {
    format!(
        "DELETE FROM {} WHERE {}",
        quote_ident(table),
        where_all(columns)
    )
}

/// How a column of the rebuilt table is filled.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildColumn {
    /// Column name in the original table
    pub source: String,
    /// Definition in the rebuilt table
    pub target: ColumnInfo,
}

/// The statements that reconstruct a table with a different column set.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildPlan {
    pub shadow: String,
    pub statements: Vec<String>,
}

fn rebuilt_column_definition(column: &ColumnInfo) -> String {
    let mut def = quote_ident(&column.name);
    if !column.type_name.is_empty() {
        def.push(' ');
        def.push_str(&column.type_name);
    }
    if column.notnull {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.dflt_value {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

/// Plans the shadow-table reconstruction of `table`.
///
/// The shadow is created with `columns`' target definitions, filled from the
/// original, then swapped in place of it. `NOT NULL`, `DEFAULT` and the
/// primary key survive; indexes and triggers on the original do not.
pub fn rebuild_table(table: &str, columns: &[RebuildColumn]) -> Result<RebuildPlan> {
    if columns.is_empty() {
        return Err(EditorError::Input(
            "A table must keep at least one field".to_string(),
        ));
    }
    let shadow = format!("_sqledit_shadow_{}", Uuid::new_v4().simple());

    let mut defs: Vec<String> = columns
        .iter()
        .map(|c| rebuilt_column_definition(&c.target))
        .collect();

    let mut key: Vec<&ColumnInfo> = columns
        .iter()
        .map(|c| &c.target)
        .filter(|c| c.pk > 0)
        .collect();
    key.sort_by_key(|c| c.pk);
    if !key.is_empty() {
        let names: Vec<&str> = key.iter().map(|c| c.name.as_str()).collect();
        defs.push(format!("PRIMARY KEY ({})", column_list(&names)));
    }

    let targets: Vec<&str> = columns.iter().map(|c| c.target.name.as_str()).collect();
    let sources: Vec<&str> = columns.iter().map(|c| c.source.as_str()).collect();

    let statements = vec![
        format!("CREATE TABLE {} ({})", quote_ident(&shadow), defs.join(", ")),
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            quote_ident(&shadow),
            column_list(&targets),
            column_list(&sources),
            quote_ident(table)
        ),
        drop_table(table),
        format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_ident(&shadow),
            quote_ident(table)
        ),
    ];

    Ok(RebuildPlan { shadow, statements })
}

/// Columns of a rebuild that leaves out `field`.
pub fn without_column(columns: &[ColumnInfo], field: &str) -> Vec<RebuildColumn> {
    columns
        .iter()
        .filter(|c| c.name != field)
        .map(|c| RebuildColumn {
            source: c.name.clone(),
            target: c.clone(),
        })
        .collect()
}

/// Columns of a rebuild that renames and/or retypes `field`.
pub fn with_altered_column(
    columns: &[ColumnInfo],
    field: &str,
    new_name: &str,
    new_type: &str,
) -> Vec<RebuildColumn> {
    columns
        .iter()
        .map(|c| {
            let mut target = c.clone();
            if c.name == field {
                target.name = new_name.to_string();
                target.type_name = new_type.to_string();
            }
            RebuildColumn {
                source: c.name.clone(),
                target,
            }
        })
        .collect()
}
