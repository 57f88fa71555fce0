//! Error types for the chat engine.

use lumen_core::error::LumenError;

/// Prefix of a `response` that carries a provider-reported failure.
pub const REMOTE_ERROR_PREFIX: &str = "API error: ";
/// Prefix of a `response` that carries a local failure.
pub const LOCAL_ERROR_PREFIX: &str = "Local error: ";

/// Errors from a chat request or from building the chat engine.
///
/// Request errors never escape the orchestrator; they are rendered into the
/// conversation's `response` text with [`ChatError::display_message`].
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The provider reported a failure in its own error envelope.
    #[error("{0}")]
    Remote(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("empty response body")]
    EmptyBody,
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    /// The request task ended without producing a reply.
    #[error("request task failed: {0}")]
    TaskFailed(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("voice error: {0}")]
    Voice(String),
}

impl ChatError {
    /// Whether the provider itself reported this failure.
    pub fn is_remote(&self) -> bool {
        matches!(self, ChatError::Remote(_))
    }

    /// Text shown in place of a reply.
    ///
    /// Remote failures are tagged `API error:`, everything else `Local error:`.
    pub fn display_message(&self) -> String {
        match self {
            ChatError::Remote(message) => format!("{}{}", REMOTE_ERROR_PREFIX, message),
            other => format!("{}{}", LOCAL_ERROR_PREFIX, other),
        }
    }
}

impl From<LumenError> for ChatError {
    fn from(err: LumenError) -> Self {
        ChatError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}
