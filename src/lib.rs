// Core infrastructure modules
pub mod core;

// Session and its seams
pub mod engine;
pub mod session;
pub mod view;

// Feature-specific modules
pub mod command_palette;
pub mod config;
pub mod repl;
pub mod results_grid;
pub mod sql;

pub use crate::core::{EditorError, Result};
pub use engine::{Engine, SqliteEngine};
pub use session::Session;
pub use view::{Level, ScriptedView, View};
