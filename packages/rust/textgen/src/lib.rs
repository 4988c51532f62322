//! Text-generation client for keyword derivation and justifications.
//!
//! Thin wrapper over a chat-completions endpoint. One call per request,
//! bounded by the configured timeout; no streaming, no retries. A
//! malformed-but-complete response is a prompt/parsing mismatch, not a
//! transient failure, so retrying it would only mask the bug.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use bookmuse_shared::{BookmuseError, Result, TextgenConfig};

/// User-Agent string for text-generation requests.
const USER_AGENT: &str = concat!("bookmuse/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the configured chat-completions service.
pub struct TextgenClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: String,
}

impl TextgenClient {
    /// Build a client from config plus the resolved API key.
    pub fn new(config: &TextgenConfig, api_key: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BookmuseError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    /// Send one prompt and return the completion text.
    ///
    /// Transport failures and non-success statuses map to
    /// [`BookmuseError::Network`]/[`BookmuseError::Status`]; a response with
    /// no message content is [`BookmuseError::MalformedResponse`].
    #[instrument(skip_all, fields(model = %self.model, prompt_chars = prompt.chars().count()))]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BookmuseError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BookmuseError::Status {
                status: status.as_u16(),
                message: error_excerpt(&body),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BookmuseError::malformed(format!("completion body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| BookmuseError::malformed("completion has no message content"))?;

        debug!(chars = content.chars().count(), "completion received");
        Ok(content)
    }
}

/// Pull a short error message out of a failure body, falling back to a
/// truncated excerpt of the raw text.
fn error_excerpt(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = v["error"]["message"].as_str() {
            return msg.to_string();
        }
    }
    bookmuse_shared::truncate_chars(body.trim(), 200)
}
