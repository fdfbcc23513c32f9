/// Connection Management Module
///
/// Opening database files, applying per-connection settings and the
/// transaction helpers used by schema reconstruction.

use crate::core::{EditorError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Settings applied to every connection right after it is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    /// Enables `PRAGMA foreign_keys` on the connection
    pub foreign_keys: bool,
    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            foreign_keys: true,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Opens the SQLite database at `path` and checks that it really is one.
///
/// SQLite opens any file lazily, so the catalog is read once here; a file
/// that is not a database fails at this point instead of on first use.
///
/// # Errors
///
/// Returns `EditorError::Open` carrying the engine's message when the file
/// cannot be opened, configured or read.
pub fn open_database(path: &Path, options: &ConnectOptions) -> Result<Connection> {
    let shown = path.display().to_string();
    let wrap = |source: rusqlite::Error| EditorError::Open {
        path: shown.clone(),
        source,
    };

    let conn = Connection::open(path).map_err(wrap)?;
    conn.busy_timeout(options.busy_timeout).map_err(wrap)?;
    conn.pragma_update(None, "foreign_keys", options.foreign_keys)
        .map_err(wrap)?;
    validate(&conn).map_err(wrap)?;

    debug!(path = %shown, "opened database");
    Ok(conn)
}

/// Opens a private in-memory database with the same settings.
pub fn open_in_memory(options: &ConnectOptions) -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.busy_timeout(options.busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", options.foreign_keys)?;
    Ok(conn)
}

fn validate(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|_| ())
}

/// Starts an explicit transaction.
pub fn begin(conn: &Connection) -> Result<()> {
    conn.execute_batch("BEGIN")?;
    Ok(())
}

/// Commits the open transaction, if there is one.
///
/// In autocommit mode every statement is already durable, so this is a
/// no-op there. A transaction the user opened with a raw `BEGIN` is
/// committed.
pub fn commit(conn: &Connection) -> Result<()> {
    if !conn.is_autocommit() {
        conn.execute_batch("COMMIT")?;
    }
    Ok(())
}

/// Rolls back the open transaction, if there is one.
pub fn rollback(conn: &Connection) -> Result<()> {
    if !conn.is_autocommit() {
        conn.execute_batch("ROLLBACK")?;
    }
    Ok(())
}
