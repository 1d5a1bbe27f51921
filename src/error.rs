//! Error types for catalog loading and the completion service boundary.
//!
//! `ConfigError` is fatal and only surfaces at startup. `CompletionError` never
//! leaves the remote resolver: it is rendered into an assistant reply instead.

use std::path::PathBuf;
use thiserror::Error;

/// Catalog or configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported catalog format: {0} (expected .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("personality '{personality}' is missing required field '{field}'")]
    MissingField { personality: String, field: String },

    #[error("personality '{0}' has an empty 'default' response list")]
    EmptyDefault(String),

    #[error("catalog defines no personalities")]
    EmptyCatalog,

    #[error("unknown personality: {0}")]
    UnknownPersonality(String),
}

/// A call to the completion service failed
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("connection error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request timed out")]
    Timeout,

    #[error("no API key configured")]
    MissingApiKey,
}

impl CompletionError {
    /// Render the failure as an assistant message so the conversation keeps going.
    /// Response bodies stay in the logs, out of the chat.
    pub fn to_reply(&self) -> String {
        let reason = match self {
            Self::Status { code, .. } => format!("API error {}", code),
            Self::Malformed(_) => "malformed response".to_string(),
            other => other.to_string(),
        };
        format!("Sorry, I couldn't reach the AI service ({}).", reason)
    }

    /// Authentication failures are not worth retrying
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Status { code: 401 | 403, .. } | Self::MissingApiKey)
    }
}
