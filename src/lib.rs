//! Personality chatbot: substring pattern matching with canned replies, and an
//! optional fallback to an OpenAI-compatible completion service.

pub mod config;
pub mod error;
pub mod llm;
pub mod matcher;
pub mod persona;
pub mod resolver;
pub mod session;
pub mod transcript;

pub use error::{CompletionError, ConfigError};
pub use persona::{Catalog, PatternRule, Personality};
pub use session::Session;
