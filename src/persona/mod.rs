//! Personality catalog.
//!
//! A catalog bundles the available personalities (greeting, canned responses
//! per tag, optional system prompt for the remote model) with the ordered list
//! of pattern rules used to classify user input. It is loaded once at startup
//! and shared read-only afterwards.

pub mod loader;

pub use loader::{from_json_str, from_toml_str, from_yaml_str, load};

use serde::Serialize;
use std::collections::BTreeMap;

/// Tag whose response list every personality must provide
pub const DEFAULT_TAG: &str = "default";

/// Bundled catalog used when no catalog file is configured
const BUILTIN_CATALOG: &str = include_str!("builtin.json");

/// A named bundle of canned responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Personality {
    /// Catalog key, e.g. "friendly"
    #[serde(skip_serializing)]
    pub id: String,
    /// Display name, e.g. "Friendly Assistant"
    pub name: String,
    /// Shown while the conversation is empty; never stored in the transcript
    pub greeting: String,
    /// Steers the remote model's tone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Candidate replies keyed by tag
    pub responses: BTreeMap<String, Vec<String>>,
}

impl Personality {
    /// Candidate replies for a tag, if the personality has any
    pub fn responses_for(&self, tag: &str) -> Option<&[String]> {
        self.responses
            .get(tag)
            .map(|r| r.as_slice())
            .filter(|r| !r.is_empty())
    }

    /// First line of the `default` list. Validated non-empty at load time.
    pub fn default_response(&self) -> &str {
        self.responses
            .get(DEFAULT_TAG)
            .and_then(|r| r.first())
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// System prompt for the remote model, falling back to a generic one
    pub fn system_prompt_or_default(&self) -> String {
        match &self.system_prompt {
            Some(prompt) => prompt.clone(),
            None => format!("You are {}. Stay in character.", self.name),
        }
    }
}

/// Substring rule mapping trigger phrases to a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct PatternRule {
    pub tag: String,
    pub patterns: Vec<String>,
}

impl PatternRule {
    pub fn new(tag: &str, patterns: &[&str]) -> Self {
        Self {
            tag: tag.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Personalities keyed by id plus the ordered pattern rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub personalities: BTreeMap<String, Personality>,
    /// Order matters: the first matching rule wins
    pub patterns: Vec<PatternRule>,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Self {
        // Covered by test_builtin_catalog_is_valid
        from_json_str(BUILTIN_CATALOG).unwrap_or_else(|e| panic!("bundled catalog: {e}"))
    }

    pub fn get(&self, id: &str) -> Option<&Personality> {
        self.personalities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.personalities.contains_key(id)
    }

    /// Personality ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.personalities.keys().map(|k| k.as_str())
    }

    /// Serialize back to the document shape accepted by [`from_json_str`]
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Tags used by pattern rules that a personality has no responses for
    pub fn uncovered_tags(&self, personality: &Personality) -> Vec<&str> {
        let mut missing: Vec<&str> = Vec::new();
        for rule in &self.patterns {
            let tag = rule.tag.as_str();
            if personality.responses_for(tag).is_none() && !missing.contains(&tag) {
                missing.push(tag);
            }
        }
        missing
    }
}
