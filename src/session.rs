//! Conversation session: one transcript, one active personality.
//!
//! A session is idle while its transcript is empty (the greeting is shown but
//! never stored) and active once a turn has been exchanged. Switching
//! personality or clearing returns it to idle.

use crate::error::ConfigError;
use crate::matcher::match_pattern;
use crate::persona::{Catalog, Personality};
use crate::resolver::{ResolvedReply, Resolver};
use crate::transcript::{Message, Transcript};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Session {
    catalog: Arc<Catalog>,
    personality_id: String,
    transcript: Transcript,
    resolver: Resolver,
    last_reply: Option<ResolvedReply>,
}

impl Session {
    pub fn new(
        catalog: Arc<Catalog>,
        personality_id: &str,
        resolver: impl Into<Resolver>,
    ) -> Result<Self, ConfigError> {
        if !catalog.contains(personality_id) {
            return Err(ConfigError::UnknownPersonality(personality_id.to_string()));
        }
        Ok(Self {
            catalog,
            personality_id: personality_id.to_string(),
            transcript: Transcript::new(),
            resolver: resolver.into(),
            last_reply: None,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn personality(&self) -> &Personality {
        // Only ids present in the catalog are ever stored
        &self.catalog.personalities[&self.personality_id]
    }

    pub fn personality_id(&self) -> &str {
        &self.personality_id
    }

    pub fn greeting(&self) -> &str {
        &self.personality().greeting
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_idle(&self) -> bool {
        self.transcript.is_empty()
    }

    /// How the most recent reply was produced; reset whenever the transcript is cleared
    pub fn last_reply(&self) -> Option<&ResolvedReply> {
        self.last_reply.as_ref()
    }

    pub fn resolver_name(&self) -> &'static str {
        self.resolver.name()
    }

    /// Switch personality. Returns `Ok(true)` when it changed, which also
    /// clears the transcript; selecting the current one is a no-op.
    pub fn select_personality(&mut self, id: &str) -> Result<bool, ConfigError> {
        if !self.catalog.contains(id) {
            return Err(ConfigError::UnknownPersonality(id.to_string()));
        }
        if id == self.personality_id {
            return Ok(false);
        }
        info!(from = %self.personality_id, to = %id, "Switching personality");
        self.personality_id = id.to_string();
        self.transcript.clear();
        self.last_reply = None;
        Ok(true)
    }

    pub fn clear(&mut self) {
        debug!(messages = self.transcript.len(), "Clearing conversation");
        self.transcript.clear();
        self.last_reply = None;
    }

    /// Run one turn. Blank input is ignored and returns `None`.
    pub fn submit(&mut self, utterance: &str) -> Option<ResolvedReply> {
        if utterance.trim().is_empty() {
            return None;
        }

        self.transcript.push(Message::user(utterance));

        let personality = &self.catalog.personalities[&self.personality_id];
        let tag = match_pattern(utterance, &self.catalog.patterns);
        let reply = self
            .resolver
            .resolve(tag, personality, utterance, self.transcript.as_slice());

        debug!(
            personality = %self.personality_id,
            tag = ?reply.tag,
            source = %reply.source,
            "Resolved reply"
        );

        self.transcript.push(Message::assistant(reply.text.clone()));
        self.last_reply = Some(reply.clone());
        Some(reply)
    }
}
