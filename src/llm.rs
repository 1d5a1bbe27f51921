//! Completion service client with timeout, bounded retry and jittered backoff.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint using
//! reqwest::blocking. Every failure comes back as a [`CompletionError`];
//! nothing here panics on a bad response.

use crate::config::LlmConfig;
use crate::error::CompletionError;
use crate::transcript::Message;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 10_000;
const JITTER_FACTOR: f64 = 0.3; // ±30% jitter

/// Check if an HTTP status code is retryable (429 rate limit or 5xx server error)
fn is_retryable_status(code: u16) -> bool {
    code == 429 || (500..600).contains(&code)
}

/// Calculate jittered backoff delay
fn jittered_backoff(base_ms: u64) -> u64 {
    let mut rng = rand::thread_rng();
    let jitter = rng.gen_range(0.0..JITTER_FACTOR) * base_ms as f64;
    let jittered = base_ms as f64 + jitter;
    (jittered as u64).min(MAX_BACKOFF_MS)
}

/// Retry-After in seconds, converted to ms and capped at the max backoff
fn retry_after_ms(value: &str) -> Option<u64> {
    let secs = value.trim().parse::<u64>().ok()?;
    Some(secs.saturating_mul(1000).min(MAX_BACKOFF_MS))
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice
    pub fn into_text(self) -> Result<String, CompletionError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CompletionError::Malformed("response has no message content".into()))
    }
}

/// Boundary to the external completion service, so resolvers can be tested with stubs
pub trait LlmClient: Send + Sync {
    /// Send the full message list (system prompt first) and return the reply text
    fn complete(&self, messages: &[Message]) -> Result<String, CompletionError>;
}

pub struct Client {
    base_url: String,
    model: String,
    /// Missing keys are reported per call rather than at startup
    api_key: Option<SecretString>,
    max_retries: u32,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    http_client: reqwest::blocking::Client,
}

impl Client {
    pub fn new(config: &LlmConfig, api_key: Option<SecretString>) -> Result<Self, CompletionError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(2)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            http_client,
        })
    }

    fn send_once(&self, url: &str, key: &SecretString, request: &ChatRequest) -> Attempt {
        let resp = self
            .http_client
            .post(url)
            .header("Authorization", format!("Bearer {}", key.expose_secret()))
            .json(request)
            .send();

        let response = match resp {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Attempt::Retry(CompletionError::Timeout, None),
            Err(e) => return Attempt::Retry(CompletionError::Http(e), None),
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<ChatResponse>() {
                Ok(body) => Attempt::Done(body.into_text()),
                Err(e) => Attempt::Done(Err(CompletionError::Malformed(e.to_string()))),
            };
        }

        let code = status.as_u16();
        // Check for Retry-After header (common in 429 responses)
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(retry_after_ms);
        let body = response.text().unwrap_or_default();
        let err = CompletionError::Status { code, body };

        if is_retryable_status(code) {
            Attempt::Retry(err, retry_after)
        } else {
            Attempt::Done(Err(err))
        }
    }
}

enum Attempt {
    Done(Result<String, CompletionError>),
    /// Retryable failure, with an optional server-requested delay in ms
    Retry(CompletionError, Option<u64>),
}

impl LlmClient for Client {
    fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let key = self.api_key.as_ref().ok_or(CompletionError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut attempt = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            attempt += 1;
            debug!(model = %self.model, attempt, messages = messages.len(), "Sending completion request");

            match self.send_once(&url, key, &request) {
                Attempt::Done(result) => return result,
                Attempt::Retry(err, _) if attempt > self.max_retries => {
                    warn!(attempts = attempt, error = %err, "Completion request failed");
                    return Err(err);
                }
                Attempt::Retry(err, retry_after) => {
                    let wait_ms = retry_after.unwrap_or_else(|| jittered_backoff(backoff_ms));
                    warn!(
                        error = %err,
                        wait_ms,
                        attempt,
                        max_retries = self.max_retries,
                        "Completion request failed, retrying"
                    );
                    thread::sleep(Duration::from_millis(wait_ms));
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
            }
        }
    }
}
