//! API key resolution
//!
//! Keys are looked up in a fixed order: a key given explicitly for the
//! session, then each [`CredentialProvider`] in turn. Blank values count as
//! absent and the first non-empty value wins.

use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default dotenv file consulted after the process environment
pub const DEFAULT_DOTENV_FILE: &str = ".env";

/// Default secrets file consulted last
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// A resolved API key, possibly absent
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
}

impl Credentials {
    /// Wrap a key; blank keys are treated as missing
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let api_key = api_key.trim();
        Self {
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
        }
    }

    /// No key
    pub fn missing() -> Self {
        Self::default()
    }

    /// Get the key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Check if a key is present
    pub fn is_present(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single place an API key may come from
pub trait CredentialProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// The key, if this source has one
    fn api_key(&self) -> Option<String>;
}

/// Reads the key from an environment variable
#[derive(Debug, Clone)]
pub struct EnvProvider {
    var: String,
}

impl EnvProvider {
    /// Read from the given variable
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialProvider for EnvProvider {
    fn name(&self) -> &str {
        "environment"
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// Reads the key from a dotenv file (`GROQ_API_KEY=...`)
///
/// The file is parsed on each lookup and never loaded into the process
/// environment, so variables already set there keep priority through
/// [`EnvProvider`]. A missing file yields no key.
#[derive(Debug, Clone)]
pub struct DotenvProvider {
    path: PathBuf,
    key: String,
}

impl DotenvProvider {
    /// Read `GROQ_API_KEY` from the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: API_KEY_ENV.to_string(),
        }
    }

    /// Use a different variable name inside the file
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for DotenvProvider {
    fn name(&self) -> &str {
        "dotenv file"
    }

    fn api_key(&self) -> Option<String> {
        let entries = dotenvy::from_path_iter(&self.path).ok()?;
        for entry in entries {
            match entry {
                Ok((name, value)) if name == self.key => return Some(value),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Ignoring malformed dotenv file {}: {}", self.path.display(), e);
                    return None;
                }
            }
        }
        None
    }
}

/// Reads the key from a TOML secrets file (`GROQ_API_KEY = "..."`)
///
/// A missing or malformed file yields no key.
#[derive(Debug, Clone)]
pub struct SecretsFileProvider {
    path: PathBuf,
    key: String,
}

impl SecretsFileProvider {
    /// Read `GROQ_API_KEY` from the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: API_KEY_ENV.to_string(),
        }
    }

    /// Use a different key name inside the file
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for SecretsFileProvider {
    fn name(&self) -> &str {
        "secrets file"
    }

    fn api_key(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let table: toml::Table = match toml::from_str(&text) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Ignoring malformed secrets file {}: {}", self.path.display(), e);
                return None;
            }
        };
        table.get(&self.key)?.as_str().map(str::to_string)
    }
}

/// A fixed key, mostly useful in tests and embedding code
#[derive(Clone)]
pub struct StaticProvider(pub Option<String>);

impl CredentialProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn api_key(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Ordered credential lookup
#[derive(Default)]
pub struct CredentialChain {
    explicit: Option<String>,
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    /// An empty chain that never finds a key
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit key, then `GROQ_API_KEY`, then `.env`, then `secrets_file`
    pub fn standard(secrets_file: impl Into<PathBuf>) -> Self {
        Self::with_files(DEFAULT_DOTENV_FILE, secrets_file)
    }

    /// Like [`CredentialChain::standard`] with an explicit dotenv path
    pub fn with_files(dotenv_file: impl Into<PathBuf>, secrets_file: impl Into<PathBuf>) -> Self {
        Self::new()
            .with_provider(EnvProvider::default())
            .with_provider(DotenvProvider::new(dotenv_file))
            .with_provider(SecretsFileProvider::new(secrets_file))
    }

    /// Append a provider after the existing ones
    pub fn with_provider(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Set the explicit session key, which takes precedence over providers
    pub fn with_explicit(mut self, api_key: impl Into<String>) -> Self {
        self.set_explicit(Some(api_key.into()));
        self
    }

    /// Replace the explicit session key
    pub fn set_explicit(&mut self, api_key: Option<String>) {
        self.explicit = api_key;
    }

    /// Resolve the first non-empty key
    pub fn resolve(&self) -> Credentials {
        if let Some(key) = self.explicit.as_deref().filter(|k| !k.trim().is_empty()) {
            tracing::debug!("Using API key provided for this session");
            return Credentials::new(key);
        }

        for provider in &self.providers {
            if let Some(key) = provider.api_key().filter(|k| !k.trim().is_empty()) {
                tracing::debug!("Using API key from {}", provider.name());
                return Credentials::new(key);
            }
        }

        Credentials::missing()
    }
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChain")
            .field("explicit", &self.explicit.is_some())
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
