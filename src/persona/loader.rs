//! Catalog loading and validation.
//!
//! Catalog files are JSON, YAML or TOML, picked by extension. All three share
//! one document shape:
//!
//! ```json
//! {
//!   "personalities": {
//!     "friendly": {
//!       "name": "Friendly Assistant",
//!       "greeting": "Hi!",
//!       "system_prompt": "optional",
//!       "responses": { "greet": ["Hey!"], "default": ["Hi there!"] }
//!     }
//!   },
//!   "patterns": [ { "tag": "greet", "patterns": ["hello", "hi"] } ]
//! }
//! ```

use super::{Catalog, PatternRule, Personality, DEFAULT_TAG};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Document shape before validation; every field optional so missing ones
/// can be reported by name.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    personalities: Option<BTreeMap<String, PersonalityDocument>>,
    #[serde(default)]
    patterns: Vec<PatternRule>,
}

#[derive(Debug, Deserialize)]
struct PersonalityDocument {
    name: Option<String>,
    greeting: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default)]
    responses: Option<BTreeMap<String, Vec<String>>>,
}

enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Load and validate a catalog file
pub fn load(path: &Path) -> Result<Catalog, ConfigError> {
    let format =
        Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = parse(&content, format, path)?;
    let catalog = validate(doc)?;
    info!(
        path = %path.display(),
        personalities = catalog.personalities.len(),
        patterns = catalog.patterns.len(),
        "Loaded catalog"
    );
    Ok(catalog)
}

pub fn from_json_str(content: &str) -> Result<Catalog, ConfigError> {
    validate(parse(content, Format::Json, Path::new("<json>"))?)
}

pub fn from_yaml_str(content: &str) -> Result<Catalog, ConfigError> {
    validate(parse(content, Format::Yaml, Path::new("<yaml>"))?)
}

pub fn from_toml_str(content: &str) -> Result<Catalog, ConfigError> {
    validate(parse(content, Format::Toml, Path::new("<toml>"))?)
}

fn parse(content: &str, format: Format, path: &Path) -> Result<CatalogDocument, ConfigError> {
    let parsed = match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: PathBuf::from(path),
        message,
    })
}

fn validate(doc: CatalogDocument) -> Result<Catalog, ConfigError> {
    let raw = doc.personalities.unwrap_or_default();
    if raw.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }

    let mut personalities = BTreeMap::new();
    for (id, p) in raw {
        let name = required(&id, "name", p.name)?;
        let greeting = required(&id, "greeting", p.greeting)?;
        let responses = p.responses.ok_or_else(|| ConfigError::MissingField {
            personality: id.clone(),
            field: "responses".to_string(),
        })?;

        match responses.get(DEFAULT_TAG) {
            None => {
                return Err(ConfigError::MissingField {
                    personality: id,
                    field: format!("responses.{}", DEFAULT_TAG),
                })
            }
            Some(list) if list.is_empty() => return Err(ConfigError::EmptyDefault(id)),
            Some(_) => {}
        }

        personalities.insert(
            id.clone(),
            Personality {
                id,
                name,
                greeting,
                system_prompt: p.system_prompt.filter(|s| !s.trim().is_empty()),
                responses,
            },
        );
    }

    let catalog = Catalog {
        personalities,
        patterns: doc.patterns,
    };

    for personality in catalog.personalities.values() {
        let missing = catalog.uncovered_tags(personality);
        if !missing.is_empty() {
            debug!(
                personality = %personality.id,
                tags = ?missing,
                "Pattern tags without canned responses; these fall back"
            );
        }
    }
    for rule in &catalog.patterns {
        if rule.patterns.iter().any(|p| p.is_empty()) {
            warn!(tag = %rule.tag, "Empty trigger phrase matches every message");
        }
    }

    Ok(catalog)
}

fn required(id: &str, field: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            personality: id.to_string(),
            field: field.to_string(),
        })
}
