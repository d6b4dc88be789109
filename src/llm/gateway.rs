//! Resilient chat-completion gateway
//!
//! Sends one logical request per call. Transient failures (transport errors,
//! HTTP 408/429/5xx) are retried with exponential backoff; everything else
//! surfaces after the first attempt.
//!
//! # Example
//!
//! ```ignore
//! use metamind::llm::{Credentials, GatewayConfig, LlmClient, LlmGateway};
//!
//! let gateway = LlmGateway::online(GatewayConfig::default());
//! let text = gateway.complete("Describe this schema...", &Credentials::new(key))?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::client::LlmClient;
use super::config::GatewayConfig;
use super::credentials::Credentials;
use super::error::{LlmError, LlmResult};
#[cfg(feature = "online")]
use super::transport::ReqwestTransport;
use super::transport::{HttpRequest, HttpResponse, Transport};

/// Waits between attempts
pub trait Sleeper: Send + Sync {
    /// Block for `duration`
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Request body for the chat-completion endpoint
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat-completion endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// How a single attempt ended
enum Attempt {
    Succeeded(String),
    /// Worth retrying unchanged
    Transient(String),
    /// Will fail the same way again
    Fatal(LlmError),
}

/// Chat-completion client with retry and response validation
pub struct LlmGateway<T: Transport, S: Sleeper = ThreadSleeper> {
    config: GatewayConfig,
    transport: T,
    sleeper: S,
}

#[cfg(feature = "online")]
impl LlmGateway<ReqwestTransport, ThreadSleeper> {
    /// Gateway over HTTP with real sleeps
    pub fn online(config: GatewayConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> LlmGateway<T, ThreadSleeper> {
    /// Gateway over the given transport with real sleeps
    pub fn new(config: GatewayConfig, transport: T) -> Self {
        Self::with_sleeper(config, transport, ThreadSleeper)
    }
}

impl<T: Transport, S: Sleeper> LlmGateway<T, S> {
    /// Gateway with an explicit sleeper
    pub fn with_sleeper(config: GatewayConfig, transport: T, sleeper: S) -> Self {
        Self {
            config,
            transport,
            sleeper,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the sleeper
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    fn request_body(&self, prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        serde_json::to_string(&request)
            .map_err(|e| LlmError::ConfigError(format!("Failed to encode request: {e}")))
    }

    fn attempt(&self, api_key: &str, body: &str) -> Attempt {
        let request = HttpRequest {
            url: &self.config.endpoint,
            api_key,
            body,
            timeout: self.config.timeout(),
        };

        match self.transport.post(&request) {
            Ok(response) => classify(response),
            Err(e) => Attempt::Transient(e.to_string()),
        }
    }
}

impl<T: Transport, S: Sleeper> LlmClient for LlmGateway<T, S> {
    fn complete(&self, prompt: &str, credentials: &Credentials) -> LlmResult<String> {
        let api_key = credentials.api_key().ok_or(LlmError::MissingCredentials)?;
        let body = self.request_body(prompt)?;
        let max_attempts = self.config.max_attempts.max(1);

        if self.config.verbose {
            tracing::debug!("Chat prompt:\n{}", prompt);
        }

        let mut attempt = 1;
        loop {
            tracing::debug!(
                "Sending request to {} (attempt {}/{})",
                self.config.endpoint,
                attempt,
                max_attempts
            );

            match self.attempt(api_key, &body) {
                Attempt::Succeeded(content) => {
                    if self.config.verbose {
                        tracing::debug!("LLM response:\n{}", content);
                    }
                    return Ok(content);
                }
                Attempt::Fatal(err) => return Err(err),
                Attempt::Transient(message) if attempt >= max_attempts => {
                    return Err(LlmError::CallFailed {
                        attempts: attempt,
                        message,
                    });
                }
                Attempt::Transient(message) => {
                    let delay = self.config.backoff_after(attempt);
                    tracing::warn!(
                        "LLM attempt {} failed ({}), retrying in {:?}",
                        attempt,
                        message,
                        delay
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn classify(response: HttpResponse) -> Attempt {
    if response.is_success() {
        return match extract_content(&response.body) {
            Ok(content) => Attempt::Succeeded(content),
            Err(e) => Attempt::Fatal(e),
        };
    }

    if response.is_transient_failure() {
        Attempt::Transient(format!("HTTP {}: {}", response.status, response.body.trim()))
    } else {
        Attempt::Fatal(LlmError::Rejected {
            status: response.status,
            message: response.body.trim().to_string(),
        })
    }
}

/// Pull the first choice's message out of a successful response body
fn extract_content(body: &str) -> LlmResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponseShape(format!("body is not a completion: {e}")))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponseShape("no choices in response".to_string()))?;

    let content = choice
        .message
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            LlmError::InvalidResponseShape("first choice has an empty message".to_string())
        })?;

    Ok(content)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::llm::transport::TransportError;

    /// Replays scripted results; repeats the last one when the script runs out
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        last: Result<HttpResponse, TransportError>,
        bodies: Mutex<Vec<String>>,
        auth: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
            let last = script
                .last()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Other("empty script".to_string())));
            Self {
                script: Mutex::new(script.into()),
                last,
                bodies: Mutex::new(Vec::new()),
                auth: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.bodies.lock().unwrap().len()
        }
    }

    impl Transport for ScriptedTransport {
        fn post(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
            self.bodies.lock().unwrap().push(request.body.to_string());
            self.auth.lock().unwrap().push(request.api_key.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.last.clone())
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn ok_body(content: &str) -> Result<HttpResponse, TransportError> {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn gateway(
        script: Vec<Result<HttpResponse, TransportError>>,
    ) -> LlmGateway<ScriptedTransport, RecordingSleeper> {
        LlmGateway::with_sleeper(
            GatewayConfig::default(),
            ScriptedTransport::new(script),
            RecordingSleeper::default(),
        )
    }

    fn key() -> Credentials {
        Credentials::new("gsk_test")
    }

    #[test]
    fn test_success_first_attempt() {
        let gw = gateway(vec![ok_body("All good")]);
        assert_eq!(gw.complete("prompt", &key()).unwrap(), "All good");
        assert_eq!(gw.transport().calls(), 1);
        assert!(gw.sleeper().delays.lock().unwrap().is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let gw = gateway(vec![ok_body("x")]);
        gw.complete("Describe users", &key()).unwrap();

        let body = gw.transport().bodies.lock().unwrap()[0].clone();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama3-70b-8192",
                "messages": [{"role": "user", "content": "Describe users"}]
            })
        );
        assert_eq!(gw.transport().auth.lock().unwrap()[0], "gsk_test");
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let gw = gateway(vec![ok_body("unused")]);
        assert_eq!(
            gw.complete("prompt", &Credentials::missing()),
            Err(LlmError::MissingCredentials)
        );
        assert_eq!(gw.transport().calls(), 0);
    }

    #[test]
    fn test_always_transient_exhausts_three_attempts() {
        let gw = gateway(vec![Err(TransportError::Connect("refused".to_string()))]);
        let err = gw.complete("prompt", &key()).unwrap_err();

        assert_eq!(gw.transport().calls(), 3);
        assert_eq!(
            *gw.sleeper().delays.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(
            err,
            LlmError::CallFailed {
                attempts: 3,
                message: "connection failed: refused".to_string(),
            }
        );
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let gw = gateway(vec![
            Err(TransportError::Timeout(120)),
            Ok(HttpResponse::new(503, "overloaded")),
            ok_body("third time lucky"),
        ]);
        assert_eq!(gw.complete("prompt", &key()).unwrap(), "third time lucky");
        assert_eq!(gw.transport().calls(), 3);
        assert_eq!(gw.sleeper().delays.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_last_failure_is_reported() {
        let gw = gateway(vec![
            Err(TransportError::Timeout(120)),
            Err(TransportError::Timeout(120)),
            Ok(HttpResponse::new(502, "bad gateway")),
        ]);
        let err = gw.complete("prompt", &key()).unwrap_err();
        assert_eq!(
            err,
            LlmError::CallFailed {
                attempts: 3,
                message: "HTTP 502: bad gateway".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_choices_not_retried() {
        let gw = gateway(vec![Ok(HttpResponse::new(200, r#"{"choices": []}"#))]);
        let err = gw.complete("prompt", &key()).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponseShape(_)));
        assert_eq!(gw.transport().calls(), 1);
        assert!(gw.sleeper().delays.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_message_is_invalid_shape() {
        let gw = gateway(vec![ok_body("   ")]);
        assert!(matches!(
            gw.complete("prompt", &key()),
            Err(LlmError::InvalidResponseShape(_))
        ));

        let gw = gateway(vec![Ok(HttpResponse::new(200, r#"{"choices": [{}]}"#))]);
        assert!(matches!(
            gw.complete("prompt", &key()),
            Err(LlmError::InvalidResponseShape(_))
        ));
    }

    #[test]
    fn test_non_json_success_is_invalid_shape() {
        let gw = gateway(vec![Ok(HttpResponse::new(200, "<html>maintenance</html>"))]);
        assert!(matches!(
            gw.complete("prompt", &key()),
            Err(LlmError::InvalidResponseShape(_))
        ));
        assert_eq!(gw.transport().calls(), 1);
    }

    #[test]
    fn test_client_error_not_retried() {
        let gw = gateway(vec![Ok(HttpResponse::new(401, "invalid api key"))]);
        let err = gw.complete("prompt", &key()).unwrap_err();
        assert_eq!(
            err,
            LlmError::Rejected {
                status: 401,
                message: "invalid api key".to_string(),
            }
        );
        assert!(!err.is_retryable());
        assert_eq!(gw.transport().calls(), 1);
    }

    #[test]
    fn test_rate_limit_is_retried() {
        let gw = gateway(vec![
            Ok(HttpResponse::new(429, "slow down")),
            ok_body("done"),
        ]);
        assert_eq!(gw.complete("prompt", &key()).unwrap(), "done");
        assert_eq!(gw.transport().calls(), 2);
    }

    #[test]
    fn test_single_attempt_config() {
        let gw = LlmGateway::with_sleeper(
            GatewayConfig::default().with_max_attempts(1),
            ScriptedTransport::new(vec![Err(TransportError::Timeout(120))]),
            RecordingSleeper::default(),
        );
        let err = gw.complete("prompt", &key()).unwrap_err();
        assert_eq!(
            err,
            LlmError::CallFailed {
                attempts: 1,
                message: "request timed out after 120 seconds".to_string(),
            }
        );
        assert!(err.is_retryable());
        assert!(err.user_message().contains("network connection"));
        assert!(gw.sleeper().delays.lock().unwrap().is_empty());
    }

    #[test]
    fn test_model_name() {
        let gw = gateway(Vec::new());
        assert_eq!(gw.model_name(), "llama3-70b-8192");
    }
}
