use chatterbox::llm::LlmClient;
use chatterbox::persona::from_json_str;
use chatterbox::resolver::{FixedClock, LocalResolver, RemoteResolver, ReplySource};
use chatterbox::transcript::{Message, Role};
use chatterbox::{Catalog, CompletionError, Session};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CATALOG: &str = r#"{
  "personalities": {
    "friendly": {
      "name": "Friendly Assistant",
      "greeting": "Hello, friend!",
      "responses": { "greet": ["Hey!"], "default": ["Hi there!"] }
    },
    "sarcastic": {
      "name": "Sarcastic Assistant",
      "greeting": "Oh. It's you.",
      "responses": { "default": ["Sure, whatever."] }
    }
  },
  "patterns": [ { "tag": "greet", "patterns": ["hello", "hi"] } ]
}"#;

fn catalog() -> Arc<Catalog> {
    Arc::new(from_json_str(CATALOG).unwrap())
}

fn local_session(personality: &str) -> Session {
    let clock = FixedClock::at(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(), 8, 15).unwrap();
    let resolver = LocalResolver::new(Box::new(StdRng::seed_from_u64(1)), Box::new(clock));
    Session::new(catalog(), personality, resolver).unwrap()
}

/// Completion service that always fails and counts calls
struct DownService {
    calls: AtomicUsize,
}

impl LlmClient for DownService {
    fn complete(&self, _messages: &[Message]) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CompletionError::Timeout)
    }
}

struct EchoService;

impl LlmClient for EchoService {
    fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(format!("{} messages, last: {}", messages.len(), last))
    }
}

#[test]
fn test_greeting_matches_canned_reply() {
    let mut session = local_session("friendly");
    let reply = session.submit("Hello there").unwrap();
    assert_eq!(reply.tag.as_deref(), Some("greet"));
    assert_eq!(reply.text, "Hey!");
}

#[test]
fn test_weather_falls_to_contextual() {
    let mut session = local_session("friendly");
    let reply = session.submit("what's the weather today").unwrap();
    assert_eq!(reply.source, ReplySource::Contextual);
    assert_eq!(
        reply.text,
        "I'm not connected to weather services, but I hope it's nice where you are!"
    );

    let mut sarcastic = local_session("sarcastic");
    let reply = sarcastic.submit("what's the weather today").unwrap();
    assert!(reply.text.contains("meteorology degree"));
}

#[test]
fn test_empty_input_is_noop() {
    let mut session = local_session("friendly");
    assert!(session.submit("").is_none());
    assert_eq!(session.transcript().len(), 0);
    assert!(session.is_idle());
}

#[test]
fn test_unmatched_input_uses_first_default() {
    let mut session = local_session("sarcastic");
    let reply = session.submit("explain monads").unwrap();
    assert_eq!(reply.text, "Sure, whatever.");
}

#[test]
fn test_personality_switch_clears_transcript() {
    let mut session = local_session("friendly");
    session.submit("hello");
    session.submit("what's the time");
    assert_eq!(session.transcript().len(), 4);

    session.select_personality("sarcastic").unwrap();
    assert_eq!(session.transcript().len(), 0);
    assert_eq!(session.greeting(), "Oh. It's you.");
}

#[test]
fn test_transcript_roles_alternate() {
    let mut session = local_session("friendly");
    session.submit("hi");
    session.submit("tell me a joke");
    let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
}

#[test]
fn test_remote_failure_keeps_conversation_alive() {
    let service = Arc::new(DownService {
        calls: AtomicUsize::new(0),
    });
    let resolver = RemoteResolver::new(service.clone(), Box::new(StdRng::seed_from_u64(0)));
    let mut session = Session::new(catalog(), "friendly", resolver).unwrap();

    let reply = session.submit("explain monads").unwrap();
    assert_eq!(reply.source, ReplySource::RemoteError);
    assert!(reply.text.contains("timed out"));

    // The failure is chat content; the next turn proceeds normally
    let reply = session.submit("hello").unwrap();
    assert_eq!(reply.text, "Hey!");
    assert_eq!(session.transcript().len(), 4);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_remote_receives_full_transcript() {
    let resolver = RemoteResolver::new(Arc::new(EchoService), Box::new(StdRng::seed_from_u64(0)));
    let mut session = Session::new(catalog(), "friendly", resolver).unwrap();

    session.submit("hello");
    let reply = session.submit("explain monads").unwrap();
    // system + hello + Hey! + explain monads
    assert_eq!(reply.text, "4 messages, last: explain monads");
    assert_eq!(reply.source, ReplySource::Remote);
}
