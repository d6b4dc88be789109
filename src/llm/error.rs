//! Error types for LLM operations
//!
//! Transient transport failures are retried inside the gateway and only
//! surface here once attempts are exhausted.

use thiserror::Error;

/// Errors that can occur while calling the chat-completion endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// No API key was supplied
    #[error("No API key available for the LLM service")]
    MissingCredentials,

    /// Every attempt failed transiently
    #[error("LLM call failed after {attempts} attempt(s): {message}")]
    CallFailed { attempts: usize, message: String },

    /// The endpoint refused the request with a non-retryable status
    #[error("LLM call rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The endpoint answered successfully but not with a usable completion
    #[error("Invalid LLM response: {0}")]
    InvalidResponseShape(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    /// Get a user-friendly error message for display
    pub fn user_message(&self) -> String {
        match self {
            LlmError::MissingCredentials => "Groq API key not found.\n\n\
                Hints:\n\
                - Pass --api-key or enter a key for this session\n\
                - Set GROQ_API_KEY in the environment or a .env file\n\
                - Add GROQ_API_KEY to secrets.toml"
                .to_string(),
            LlmError::CallFailed { attempts, message } => {
                format!(
                    "API call failed after {attempts} attempt(s): {message}\n\n\
                    Hints:\n\
                    - Check your network connection\n\
                    - The LLM service may be experiencing issues, try again later"
                )
            }
            LlmError::Rejected { status, message } => {
                format!(
                    "API call was rejected (HTTP {status}): {message}\n\n\
                    Hint: Check that the API key and model name are valid."
                )
            }
            LlmError::InvalidResponseShape(msg) => {
                format!("Invalid response structure from the LLM service: {msg}")
            }
            _ => self.to_string(),
        }
    }

    /// Check if re-invoking the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::CallFailed { .. })
    }
}

impl From<toml::de::Error> for LlmError {
    fn from(err: toml::de::Error) -> Self {
        LlmError::ConfigError(err.to_string())
    }
}
