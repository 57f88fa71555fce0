//! Observable conversation state.

use crate::mood::Mood;

/// Everything the display surface renders.
///
/// Read-only outside this crate; all mutation goes through
/// [`ConversationOrchestrator`](crate::orchestrator::ConversationOrchestrator).
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub(crate) input: String,
    pub(crate) response: String,
    pub(crate) mood: Mood,
    pub(crate) voice_enabled: bool,
    pub(crate) is_loading: bool,
    pub(crate) is_error: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConversationState {
    pub fn new(voice_enabled: bool) -> Self {
        Self {
            input: String::new(),
            response: String::new(),
            mood: Mood::Undefined,
            voice_enabled,
            is_loading: false,
            is_error: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether `response` holds an error message rather than a reply.
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}
