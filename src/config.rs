//! Runtime configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML config file, then
//! command-line flags and environment variables (applied by the binary).

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which resolver answers messages that no canned response covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Contextual keyword replies, no network
    #[default]
    Local,
    /// Fall back to the completion service
    Remote,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Catalog file; the bundled catalog is used when unset
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Personality selected at startup
    #[serde(default = "default_personality")]
    pub personality: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_personality() -> String {
    "friendly".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            personality: default_personality(),
            mode: Mode::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Completion service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-request timeout so a hung call cannot wedge the conversation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt for 429/5xx/connection errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_max_tokens() -> Option<u32> {
    Some(300)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }
}

/// Default config file location (~/.chatterbox/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatterbox").join("config.toml"))
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid config file")
    }

    /// Load from an explicit path; the file must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Load the explicit path if given, else the default location if it
    /// exists, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
