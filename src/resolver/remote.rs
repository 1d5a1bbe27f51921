use super::{canned_response, ReplySource, ResolvedReply};
use crate::llm::LlmClient;
use crate::persona::Personality;
use crate::transcript::{request_messages, Message};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use tracing::{debug, warn};

/// Canned responses, then the completion service.
///
/// `resolve` never fails: a completion error becomes the reply text.
pub struct RemoteResolver {
    client: Arc<dyn LlmClient>,
    rng: Box<dyn RngCore + Send>,
}

impl RemoteResolver {
    pub fn new(client: Arc<dyn LlmClient>, rng: Box<dyn RngCore + Send>) -> Self {
        Self { client, rng }
    }

    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self::new(client, Box::new(StdRng::from_entropy()))
    }

    pub fn resolve(
        &mut self,
        tag: Option<&str>,
        personality: &Personality,
        transcript: &[Message],
    ) -> ResolvedReply {
        let tag_owned = tag.map(|t| t.to_string());
        if let Some(text) = canned_response(tag, personality, self.rng.as_mut()) {
            return ResolvedReply {
                text,
                source: ReplySource::Canned,
                tag: tag_owned,
            };
        }

        let messages = request_messages(&personality.system_prompt_or_default(), transcript);
        debug!(
            personality = %personality.id,
            messages = messages.len(),
            "No canned response, asking completion service"
        );

        match self.client.complete(&messages) {
            Ok(text) => ResolvedReply {
                text,
                source: ReplySource::Remote,
                tag: tag_owned,
            },
            Err(e) => {
                if e.is_auth() {
                    warn!(error = %e, "Completion service rejected credentials");
                } else {
                    warn!(error = %e, "Completion service call failed");
                }
                ResolvedReply {
                    text: e.to_reply(),
                    source: ReplySource::RemoteError,
                    tag: tag_owned,
                }
            }
        }
    }
}
