/// sqledit Error Module
///
/// This module defines the error type shared by every layer of sqledit.
/// Engine failures keep the engine's own message so it can be shown to the
/// user verbatim.
use thiserror::Error;

/// Error type for the sqledit application.
///
/// The variants fall into three groups:
/// - opening a database file (`Open`)
/// - executing statements (`Database`, `Query`, `Schema`)
/// - user input that cannot be acted on (`Input`, `NotConnected`,
///   `NoTableSelected`, `NoRowSelected`)
///
/// plus `Config` failures of the binary.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Errors reported by SQLite while running a statement
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The selected file could not be opened as a database
    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Statement text the engine refuses to run as given
    #[error("{0}")]
    Query(String),

    /// Catalog lookups that found nothing usable
    #[error("Schema error: {0}")]
    Schema(String),

    /// Rejected user input (empty names, unknown fields, bad choices)
    #[error("{0}")]
    Input(String),

    #[error("No database is open")]
    NotConnected,

    #[error("No table selected")]
    NoTableSelected,

    #[error("No record selected")]
    NoRowSelected,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EditorError {
    /// Returns true for failures caused by what the user asked for rather
    /// than by the engine. These are reported as warnings.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EditorError::Input(_)
                | EditorError::NotConnected
                | EditorError::NoTableSelected
                | EditorError::NoRowSelected
        )
    }
}

impl From<toml::de::Error> for EditorError {
    fn from(err: toml::de::Error) -> Self {
        EditorError::Config(err.to_string())
    }
}

/// Result alias using `EditorError` across the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let db_err = EditorError::Database(rusqlite::Error::ExecuteReturnedResults);
        assert!(db_err.to_string().contains("Database error"));

        let input_err = EditorError::Input("Table name is required".to_string());
        assert_eq!(input_err.to_string(), "Table name is required");

        let config_err = EditorError::Config("Invalid config".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(EditorError::NoTableSelected.is_user_error());
        assert!(EditorError::NoRowSelected.is_user_error());
        assert!(EditorError::NotConnected.is_user_error());
        assert!(EditorError::Input("x".into()).is_user_error());
        assert!(!EditorError::Schema("x".into()).is_user_error());
        assert!(!EditorError::Query("x".into()).is_user_error());
        assert!(!EditorError::Database(rusqlite::Error::InvalidQuery).is_user_error());
    }

    #[test]
    fn test_error_conversion() {
        let err: EditorError = rusqlite::Error::InvalidQuery.into();
        match err {
            EditorError::Database(_) => {}
            _ => panic!("Expected Database error"),
        }

        let toml_err = toml::from_str::<toml::Value>("[ui\ncolor = ").unwrap_err();
        let err: EditorError = toml_err.into();
        assert!(matches!(err, EditorError::Config(_)));
    }
}
