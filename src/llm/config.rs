//! Configuration for the chat-completion gateway
//!
//! All fields have defaults, so a TOML file only needs the keys it changes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{LlmError, LlmResult};

/// Default chat-completion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Chat-completion URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay before the first retry in seconds, doubled for each further retry
    #[serde(default = "default_initial_backoff_seconds")]
    pub initial_backoff_seconds: u64,

    /// Log prompts and responses at debug level
    #[serde(default)]
    pub verbose: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_backoff_seconds() -> u64 {
    1
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
            initial_backoff_seconds: default_initial_backoff_seconds(),
            verbose: false,
        }
    }
}

impl GatewayConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> LlmResult<Self> {
        let config: GatewayConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> LlmResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LlmError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the gateway cannot work with
    pub fn validate(&self) -> LlmResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(LlmError::ConfigError("endpoint must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::ConfigError("model must not be empty".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(LlmError::ConfigError(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(LlmError::ConfigError(
                "timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-attempt timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the total number of attempts
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the initial backoff in seconds
    pub fn with_initial_backoff(mut self, seconds: u64) -> Self {
        self.initial_backoff_seconds = seconds;
        self
    }

    /// Enable verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn backoff_after(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as u32;
        Duration::from_secs(self.initial_backoff_seconds.saturating_mul(1u64 << exponent))
    }
}
