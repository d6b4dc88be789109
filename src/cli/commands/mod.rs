//! CLI command implementations

pub mod chat;
pub mod document;
pub mod tables;

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use metamind::llm::{
    CredentialChain, DEFAULT_DOTENV_FILE, DEFAULT_SECRETS_FILE, GatewayConfig, LlmGateway, ReqwestTransport,
};
use metamind::{DatabaseHandle, SchemaSource};

use crate::error::CliError;

pub use chat::handle_chat;
pub use document::{DocumentArgs, handle_document};
pub use tables::handle_tables;

/// Where the schema comes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// SQLite database file to introspect
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// File with CREATE TABLE statements ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub sql: Option<String>,
}

/// Settings shared by every command that calls the LLM
#[derive(Clone)]
pub struct GatewayArgs {
    pub api_key: Option<String>,
    pub config: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub secrets: Option<PathBuf>,
    pub verbose: bool,
}

impl SourceArgs {
    /// Resolve into a schema source, reading SQL text eagerly
    pub fn to_source(&self) -> Result<SchemaSource, CliError> {
        match (&self.db, &self.sql) {
            (Some(path), _) => Ok(SchemaSource::Database(DatabaseHandle::File(path.clone()))),
            (None, Some(input)) => Ok(SchemaSource::RawText(load_input(input)?)),
            (None, None) => Err(CliError::InvalidArgument(
                "one of --db or --sql is required".to_string(),
            )),
        }
    }
}

impl GatewayArgs {
    /// Build the HTTP gateway from `--config` and `--verbose`
    pub fn gateway(&self) -> Result<LlmGateway<ReqwestTransport>, CliError> {
        let config = match &self.config {
            Some(path) => GatewayConfig::from_toml_file(path)?,
            None => GatewayConfig::default(),
        };
        Ok(LlmGateway::online(config.with_verbose(self.verbose)))
    }

    /// `--api-key`, then `GROQ_API_KEY`, then the dotenv file, then the secrets file
    pub fn credentials(&self) -> CredentialChain {
        let dotenv = self
            .env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTENV_FILE));
        let secrets = self
            .secrets
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE));
        let mut chain = CredentialChain::with_files(dotenv, secrets);
        chain.set_explicit(self.api_key.clone());
        chain
    }
}

/// Load input content from file or stdin
fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| CliError::FileReadError(input.to_string(), e.to_string()))
    }
}
