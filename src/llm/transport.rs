//! HTTP transport for the chat-completion endpoint
//!
//! The gateway talks to the network only through [`Transport`], so retry and
//! response handling can be exercised against a fake.

use std::time::Duration;

use thiserror::Error;

/// A single POST to the chat-completion endpoint
#[derive(Clone)]
pub struct HttpRequest<'a> {
    /// Endpoint URL
    pub url: &'a str,
    /// Bearer token for the `Authorization` header
    pub api_key: &'a str,
    /// JSON body
    pub body: &'a str,
    /// Deadline for this attempt
    pub timeout: Duration,
}

/// What came back from the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check for a status worth retrying (408, 429, 5xx)
    pub fn is_transient_failure(&self) -> bool {
        matches!(self.status, 408 | 429) || (500..600).contains(&self.status)
    }
}

/// Failures before any HTTP status was received
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt exceeded its deadline
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport-level failure
    #[error("request failed: {0}")]
    Other(String),
}

/// Sends one request and returns the raw response
pub trait Transport: Send + Sync {
    /// Perform the POST, blocking until a response or failure
    fn post(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError>;
}

/// Blocking `reqwest` transport
#[cfg(feature = "online")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "online")]
impl ReqwestTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Use an existing client
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "online")]
impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "online")]
impl Transport for ReqwestTransport {
    fn post(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(request.url)
            .bearer_auth(request.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request.body.to_string())
            .timeout(request.timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(request.timeout.as_secs())
                } else if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(request.timeout.as_secs())
            } else {
                TransportError::Other(e.to_string())
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}
