//! MetaMind - documentation and chat for relational schemas
//!
//! Provides:
//! - Schema extraction from SQLite databases and pasted DDL
//! - Deterministic prompt construction for documentation and follow-up chat
//! - A chat-completion gateway with retry, backoff and response validation
//! - A conversation session tying the three together

pub mod llm;
pub mod schema;
pub mod session;

// Re-export commonly used types
pub use llm::{
    ConversationTurn, CredentialChain, Credentials, DocumentationResult, GatewayConfig,
    LlmClient, LlmError, LlmGateway, LlmResult, Role,
};
pub use schema::{
    CanonicalSchemaText, ColumnSchema, DatabaseHandle, NormalizeOptions, SchemaError,
    SchemaResult, SchemaSource, TableSchema, normalize,
};
pub use session::{Session, SessionError, SessionResult};
