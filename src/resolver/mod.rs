//! Response selection.
//!
//! Both strategies try the personality's canned responses for the matched tag
//! first. When none apply, the local strategy answers with a contextual
//! keyword reply and the remote strategy asks the completion service.

pub mod clock;
pub mod contextual;
pub mod local;
pub mod remote;

pub use clock::{Clock, FixedClock, SystemClock};
pub use local::LocalResolver;
pub use remote::RemoteResolver;

use crate::persona::Personality;
use crate::transcript::Message;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::fmt;

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Canned,
    Contextual,
    Remote,
    /// The completion call failed and the reply describes the failure
    RemoteError,
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Canned => "canned",
            Self::Contextual => "contextual",
            Self::Remote => "remote",
            Self::RemoteError => "remote_error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReply {
    pub text: String,
    pub source: ReplySource,
    /// Tag chosen by the pattern matcher, if any
    pub tag: Option<String>,
}

/// Uniformly random canned response for a tag
pub fn canned_response(
    tag: Option<&str>,
    personality: &Personality,
    rng: &mut dyn RngCore,
) -> Option<String> {
    personality
        .responses_for(tag?)?
        .choose(rng)
        .map(|s| s.to_string())
}

/// The strategy a session resolves replies with
pub enum Resolver {
    Local(LocalResolver),
    Remote(RemoteResolver),
}

impl Resolver {
    /// `transcript` must already contain the user message being answered
    pub fn resolve(
        &mut self,
        tag: Option<&str>,
        personality: &Personality,
        utterance: &str,
        transcript: &[Message],
    ) -> ResolvedReply {
        match self {
            Self::Local(r) => r.resolve(tag, personality, utterance),
            Self::Remote(r) => r.resolve(tag, personality, transcript),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }
}

impl From<LocalResolver> for Resolver {
    fn from(r: LocalResolver) -> Self {
        Self::Local(r)
    }
}

impl From<RemoteResolver> for Resolver {
    fn from(r: RemoteResolver) -> Self {
        Self::Remote(r)
    }
}
