/// Engine Module
///
/// The engine interface the session talks to, and its SQLite implementation.
/// The session never touches a `rusqlite::Connection` directly, so it can be
/// driven by any type implementing [`Engine`].

use crate::core::db::{self, ColumnInfo, ConnectOptions, Outcome, QueryResult, Value};
use crate::core::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Everything the session needs from a database engine.
pub trait Engine: Sized {
    /// Opens (and validates) the database at `path`.
    fn open(path: &Path, options: &ConnectOptions) -> Result<Self>;

    /// Names of the user tables, in catalog order.
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Column descriptors of `table`, in declaration order.
    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Executes a statement that returns no rows; yields the change count.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Executes a statement and returns all of its rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Executes user-typed text, letting the engine decide whether it
    /// returns rows.
    fn run(&mut self, sql: &str) -> Result<Outcome>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    /// Runs `statements` inside one transaction.
    ///
    /// Either every statement takes effect or none does. The error of the
    /// failing statement is returned after the rollback.
    fn execute_atomic(&mut self, statements: &[String]) -> Result<()> {
        self.begin()?;
        for sql in statements {
            if let Err(err) = self.execute(sql, &[]) {
                if let Err(rollback_err) = self.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                return Err(err);
            }
        }
        self.commit()
    }
}

/// [`Engine`] backed by a single rusqlite connection.
#[derive(Debug)]
pub struct SqliteEngine {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteEngine {
    /// Creates an engine over a private in-memory database.
    pub fn in_memory(options: &ConnectOptions) -> Result<Self> {
        Ok(SqliteEngine {
            conn: db::open_in_memory(options)?,
            path: None,
        })
    }

    /// Path of the open file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Engine for SqliteEngine {
    fn open(path: &Path, options: &ConnectOptions) -> Result<Self> {
        if path == Path::new(":memory:") {
            return Self::in_memory(options);
        }
        Ok(SqliteEngine {
            conn: db::open_database(path, options)?,
            path: Some(path.to_path_buf()),
        })
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        db::list_tables(&self.conn)
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        db::table_columns(&self.conn, table)
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        db::execute(&self.conn, sql, params)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        db::query(&self.conn, sql, params)
    }

    fn run(&mut self, sql: &str) -> Result<Outcome> {
        db::run(&self.conn, sql)
    }

    fn begin(&mut self) -> Result<()> {
        db::begin(&self.conn)
    }

    fn commit(&mut self) -> Result<()> {
        db::commit(&self.conn)
    }

    fn rollback(&mut self) -> Result<()> {
        db::rollback(&self.conn)
    }
}
