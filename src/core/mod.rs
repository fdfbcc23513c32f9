/// Core Module for sqledit
///
/// Shared infrastructure: the error type and the thin database layer that
/// every action of the session is built on.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{EditorError, Result};
