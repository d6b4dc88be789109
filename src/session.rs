//! Conversation session
//!
//! A [`Session`] owns one conversation: the active schema, the last generated
//! documentation, and the transcript. It is single-owner and every call runs
//! to completion before the next one starts. Failed calls never leave partial
//! state behind, with one deliberate exception: a question is recorded before
//! it is sent, so it stays in the transcript even when no answer arrives.

use thiserror::Error;

use crate::llm::{
    ConversationTurn, CredentialChain, DocumentationResult, LlmClient, LlmError,
    build_chat_prompt, build_documentation_prompt,
};
use crate::schema::{CanonicalSchemaText, NormalizeOptions, SchemaError, SchemaSource, normalize_with};

/// Errors surfaced by session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Documentation was requested before any schema was submitted
    #[error("No schema loaded. Submit a schema first.")]
    NoSchemaLoaded,

    /// A question was asked before documentation was generated
    #[error("No documentation generated yet. Generate documentation first.")]
    NoDocumentation,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Get a user-friendly error message for display
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Llm(err) => err.user_message(),
            _ => self.to_string(),
        }
    }
}

/// State for one conversation about one schema
pub struct Session<C: LlmClient> {
    client: C,
    credentials: CredentialChain,
    options: NormalizeOptions,
    schema: Option<CanonicalSchemaText>,
    documentation: Option<DocumentationResult>,
    turns: Vec<ConversationTurn>,
}

impl<C: LlmClient> Session<C> {
    /// Create an empty session
    pub fn new(client: C, credentials: CredentialChain) -> Self {
        Self {
            client,
            credentials,
            options: NormalizeOptions::default(),
            schema: None,
            documentation: None,
            turns: Vec::new(),
        }
    }

    /// Set the normalization options used by [`Session::submit_schema`]
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set or clear the API key entered for this session
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.credentials.set_explicit(api_key);
    }

    /// Normalize `source` and make it the active schema
    ///
    /// Clears documentation and the transcript on success. On failure the
    /// session is left exactly as it was.
    pub fn submit_schema(&mut self, source: &SchemaSource) -> SessionResult<()> {
        let schema = normalize_with(source, &self.options)?;
        tracing::info!("Schema submitted ({} bytes)", schema.as_str().len());

        self.schema = Some(schema);
        self.documentation = None;
        self.turns.clear();
        Ok(())
    }

    /// Ask the model to document the active schema
    ///
    /// Replaces earlier documentation on success; keeps it on failure.
    pub fn generate_documentation(&mut self) -> SessionResult<&DocumentationResult> {
        let schema = self.schema.as_ref().ok_or(SessionError::NoSchemaLoaded)?;
        let prompt = build_documentation_prompt(schema);

        let text = self.client.complete(&prompt, &self.credentials.resolve())?;
        tracing::info!("Documentation generated ({} bytes)", text.len());

        Ok(self.documentation.insert(DocumentationResult::new(text)))
    }

    /// Ask a follow-up question about the documented schema
    ///
    /// The question is appended to the transcript before the call. The answer
    /// is appended only if the call succeeds.
    pub fn ask(&mut self, question: &str) -> SessionResult<String> {
        let (schema, documentation) = match (&self.schema, &self.documentation) {
            (Some(schema), Some(documentation)) => (schema, documentation),
            _ => return Err(SessionError::NoDocumentation),
        };

        self.turns.push(ConversationTurn::user(question));
        let prompt = build_chat_prompt(schema, documentation, &self.turns, question);

        let answer = self.client.complete(&prompt, &self.credentials.resolve())?;
        self.turns.push(ConversationTurn::assistant(answer.clone()));
        Ok(answer)
    }

    /// The active schema, if any
    pub fn schema(&self) -> Option<&CanonicalSchemaText> {
        self.schema.as_ref()
    }

    /// The last generated documentation, if any
    pub fn documentation(&self) -> Option<&DocumentationResult> {
        self.documentation.as_ref()
    }

    /// The transcript in order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Get the client
    pub fn client(&self) -> &C {
        &self.client
    }
}
