use super::clock::{Clock, SystemClock};
use super::{canned_response, contextual, ReplySource, ResolvedReply};
use crate::persona::Personality;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Canned responses, then contextual keyword replies. Never touches the network.
pub struct LocalResolver {
    rng: Box<dyn RngCore + Send>,
    clock: Box<dyn Clock>,
}

impl LocalResolver {
    pub fn new(rng: Box<dyn RngCore + Send>, clock: Box<dyn Clock>) -> Self {
        Self { rng, clock }
    }

    /// Entropy-seeded generator and the system clock
    pub fn system() -> Self {
        Self::new(Box::new(StdRng::from_entropy()), Box::new(SystemClock))
    }

    pub fn resolve(
        &mut self,
        tag: Option<&str>,
        personality: &Personality,
        utterance: &str,
    ) -> ResolvedReply {
        let tag_owned = tag.map(|t| t.to_string());
        if let Some(text) = canned_response(tag, personality, self.rng.as_mut()) {
            return ResolvedReply {
                text,
                source: ReplySource::Canned,
                tag: tag_owned,
            };
        }

        ResolvedReply {
            text: contextual::respond(utterance, personality, self.clock.as_ref(), self.rng.as_mut()),
            source: ReplySource::Contextual,
            tag: tag_owned,
        }
    }
}
