//! Error types for schema extraction
//!
//! Every failure keeps the underlying driver or parser message so callers can
//! show it unchanged.

use thiserror::Error;

/// Errors that can occur while turning a schema source into canonical text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The file cannot be opened or is not a valid database
    #[error("Unreadable schema source: {0}")]
    UnreadableSource(String),

    /// Raw schema text was empty or whitespace only
    #[error("Schema input is empty")]
    EmptyInput,

    /// A lower-level driver or parser failed while reading the schema
    #[error("Schema introspection failed: {0}")]
    IntrospectionFailure(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

impl From<rusqlite::Error> for SchemaError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::NotADatabase) | Some(rusqlite::ErrorCode::CannotOpen) => {
                SchemaError::UnreadableSource(err.to_string())
            }
            _ => SchemaError::IntrospectionFailure(err.to_string()),
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::UnreadableSource(err.to_string())
    }
}
