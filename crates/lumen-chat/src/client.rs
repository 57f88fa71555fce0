//! Chat completions client.
//!
//! [`ChatClient`] is the seam the orchestrator talks to. [`HttpChatClient`]
//! is the production implementation: one POST per request, bearer auth, no
//! retries. Body interpretation lives in [`parse_reply`] so it can be
//! exercised without a network.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use lumen_core::config::ChatConfig;

use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponseBody};

/// Sends one chat request and returns the assistant text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

/// `reqwest`-backed client for an OpenAI-compatible endpoint.
pub struct HttpChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpChatClient {
    /// Create a client for `endpoint` authenticating with `api_key`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ChatError::Config("chat endpoint must not be empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("lumen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Create a client from the `[chat]` config section and a resolved key.
    pub fn from_config(config: &ChatConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        Self::new(config.endpoint.clone(), api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for HttpChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpChatClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            "Sending chat request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Chat response received");

        // Error envelopes arrive with non-2xx statuses; the body decides.
        parse_reply(&body)
    }
}

/// Interpret a response body.
///
/// - empty or whitespace-only → [`ChatError::EmptyBody`]
/// - invalid JSON → [`ChatError::MalformedBody`]
/// - `{"choices":[{"message":{"content":..}}]}` → the content
/// - `{"error":{"message":..}}` → [`ChatError::Remote`]
/// - anything else → [`ChatError::UnexpectedShape`]
pub fn parse_reply(body: &[u8]) -> Result<String, ChatError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ChatError::EmptyBody);
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ChatError::MalformedBody(e.to_string()))?;

    let parsed: ChatResponseBody = serde_json::from_value(value).map_err(|_| {
        ChatError::UnexpectedShape("expected `choices` or `error` object".to_string())
    })?;

    match parsed {
        ChatResponseBody::Completion { choices } => choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ChatError::UnexpectedShape("no assistant message in `choices`".to_string())
            }),
        ChatResponseBody::Failure { error } => Err(ChatError::Remote(error.message)),
    }
}

// =============================================================================
// Tests
// =============================================================================
