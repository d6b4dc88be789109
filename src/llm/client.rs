//! LLM client trait
//!
//! `LlmClient` is the seam between the conversation session and whatever
//! answers prompts. [`LlmGateway`](super::gateway::LlmGateway) is the real
//! implementation.

#[cfg(test)]
use std::sync::Mutex;

use super::credentials::Credentials;
#[cfg(test)]
use super::error::LlmError;
use super::error::LlmResult;

/// Trait for LLM client implementations
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given prompt
    ///
    /// # Arguments
    /// * `prompt` - The complete prompt text
    /// * `credentials` - The resolved API key; missing keys fail fast
    ///
    /// # Returns
    /// The generated text response
    fn complete(&self, prompt: &str, credentials: &Credentials) -> LlmResult<String>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

/// A mock LLM client for testing
#[cfg(test)]
pub struct MockLlmClient {
    response: String,
    model: String,
    should_fail: bool,
    prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockLlmClient {
    /// Create a new mock client that returns the given response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            model: "mock-model".to_string(),
            should_fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock client that fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Switch between failing and succeeding
    pub fn set_failing(&mut self, should_fail: bool) {
        self.should_fail = should_fail;
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl LlmClient for MockLlmClient {
    fn complete(&self, prompt: &str, credentials: &Credentials) -> LlmResult<String> {
        if !credentials.is_present() {
            return Err(LlmError::MissingCredentials);
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.should_fail {
            Err(LlmError::CallFailed {
                attempts: 3,
                message: "Mock failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
