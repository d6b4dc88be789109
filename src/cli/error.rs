//! CLI error types

use metamind::{LlmError, SchemaError, SessionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CliError {
    /// Message to print before exiting
    pub fn user_message(&self) -> String {
        match self {
            CliError::Llm(err) => err.user_message(),
            CliError::Session(err) => err.user_message(),
            _ => self.to_string(),
        }
    }
}
