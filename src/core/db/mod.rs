/// Database Module
///
/// The database layer is split into three concerns:
/// - **Connection Management** (`connection.rs`): opening and validating files, transactions
/// - **Schema Introspection** (`schema.rs`): table names and column descriptors
/// - **Query Execution** (`query.rs`): running statements and collecting rows
///
/// All functions take a `rusqlite::Connection` explicitly; the session owns
/// the connection through [`crate::engine::SqliteEngine`].
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
