//! LLM prompt construction and the chat-completion gateway
//!
//! # Features
//!
//! - **Prompts**: deterministic builders for schema documentation, per-table
//!   documentation, and follow-up chat
//! - **Gateway**: one hosted chat-completion endpoint with bounded retry and
//!   exponential backoff (requires the `online` feature for the HTTP transport)
//! - **Credentials**: ordered API key lookup (session key, environment, `.env`, secrets file)
//!
//! # Example
//!
//! ```ignore
//! use metamind::llm::{
//!     CredentialChain, GatewayConfig, LlmClient, LlmGateway, build_documentation_prompt,
//! };
//!
//! let gateway = LlmGateway::online(GatewayConfig::default());
//! let credentials = CredentialChain::standard("secrets.toml").resolve();
//! let prompt = build_documentation_prompt(&schema_text);
//! let docs = gateway.complete(&prompt, &credentials)?;
//! ```
//!
//! Without the `online` feature a [`Transport`] must be supplied by the caller.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod prompt;
pub mod transport;

// Re-export main types
pub use client::LlmClient;
pub use config::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GatewayConfig};
pub use credentials::{
    API_KEY_ENV, CredentialChain, CredentialProvider, Credentials, DEFAULT_DOTENV_FILE,
    DEFAULT_SECRETS_FILE, DotenvProvider, EnvProvider, SecretsFileProvider, StaticProvider,
};
pub use error::{LlmError, LlmResult};
pub use gateway::{LlmGateway, Sleeper, ThreadSleeper};
pub use prompt::{
    ConversationTurn, DocumentationResult, Role, build_chat_prompt, build_documentation_prompt,
    build_table_documentation_prompt, render_history,
};
#[cfg(feature = "online")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, Transport, TransportError};

#[cfg(test)]
pub use client::MockLlmClient;
