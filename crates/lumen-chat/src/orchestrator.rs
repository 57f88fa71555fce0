//! Conversation orchestrator: owns the conversation state and drives one
//! chat request at a time.
//!
//! Lifecycle of an exchange:
//! - Idle -> Submitting (`submit`: input captured and cleared, mood set,
//!   request task spawned)
//! - Submitting -> Idle with a reply, or Idle with an error message
//!   (`settle` / `try_settle` applies the completion)
//!
//! The request runs in a spawned Tokio task and reports back over a channel.
//! Completions are applied by whoever owns the orchestrator, so every state
//! change happens in a single `&mut self` call.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::client::ChatClient;
use crate::error::ChatError;
use crate::mood;
use crate::state::ConversationState;
use crate::types::{ChatRequest, Persona};
use crate::voice::{SpeechOutput, Utterance};

/// Result of one request, tagged with the id it was issued under.
#[derive(Debug)]
struct Completion {
    request_id: Uuid,
    outcome: Result<String, ChatError>,
}

/// Single-conversation coordinator between the display surface, the chat
/// client and speech output.
pub struct ConversationOrchestrator {
    state: ConversationState,
    persona: Persona,
    client: Arc<dyn ChatClient>,
    speech: Arc<dyn SpeechOutput>,
    in_flight: Option<Uuid>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl ConversationOrchestrator {
    /// Create an orchestrator with voice output enabled.
    pub fn new(
        persona: Persona,
        client: Arc<dyn ChatClient>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        Self {
            state: ConversationState::default(),
            persona,
            client,
            speech,
            in_flight: None,
            completions_tx,
            completions,
        }
    }

    /// Set the initial voice flag.
    pub fn with_voice_enabled(mut self, enabled: bool) -> Self {
        self.state.voice_enabled = enabled;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Id of the request currently in flight, if any.
    pub fn in_flight(&self) -> Option<Uuid> {
        self.in_flight
    }

    /// Replace the pending input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.input = text.into();
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        if self.state.voice_enabled != enabled {
            debug!(enabled, "Voice output toggled");
        }
        self.state.voice_enabled = enabled;
    }

    /// Flip voice output and return the new value.
    pub fn toggle_voice(&mut self) -> bool {
        let enabled = !self.state.voice_enabled;
        self.set_voice_enabled(enabled);
        enabled
    }

    /// Send the current input.
    ///
    /// Does nothing and returns `None` when the trimmed input is empty or a
    /// request is already in flight. Otherwise marks the conversation as
    /// loading, clears the input, sets the mood from the captured text and
    /// spawns the request, returning its id.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self) -> Option<Uuid> {
        if self.state.is_loading || self.state.input.trim().is_empty() {
            return None;
        }

        self.state.is_loading = true;
        let text = self.state.input.trim().to_string();
        self.state.input.clear();
        self.state.mood = mood::classify(&text);

        let request_id = Uuid::new_v4();
        self.in_flight = Some(request_id);
        info!(
            request_id = %request_id,
            mood = %self.state.mood,
            chars = text.chars().count(),
            "Submitting message"
        );

        let request = ChatRequest::new(&self.persona, text);
        let client = Arc::clone(&self.client);
        let tx = self.completions_tx.clone();
        let span = tracing::info_span!("chat_request", request_id = %request_id);
        tokio::spawn(
            async move {
                // Inner task so a panicking client still yields a completion.
                let send = tokio::spawn(
                    async move { client.send(&request).await }.in_current_span(),
                );
                let outcome = match send.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(ChatError::TaskFailed(e.to_string())),
                };
                if tx.send(Completion { request_id, outcome }).is_err() {
                    debug!("Orchestrator dropped before the reply arrived");
                }
            }
            .instrument(span),
        );

        Some(request_id)
    }

    /// Wait for the in-flight request to finish and apply its outcome.
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn settle(&mut self) -> bool {
        while self.in_flight.is_some() {
            match self.completions.recv().await {
                Some(completion) => {
                    if self.apply(completion) {
                        return true;
                    }
                }
                None => return false,
            }
        }
        false
    }

    /// Apply the in-flight request's outcome if it has already arrived.
    pub fn try_settle(&mut self) -> bool {
        while self.in_flight.is_some() {
            match self.completions.try_recv() {
                Ok(completion) => {
                    if self.apply(completion) {
                        return true;
                    }
                }
                Err(_) => return false,
            }
        }
        false
    }

    fn apply(&mut self, completion: Completion) -> bool {
        if self.in_flight != Some(completion.request_id) {
            warn!(
                request_id = %completion.request_id,
                "Dropping completion for a request that is not in flight"
            );
            return false;
        }

        self.in_flight = None;
        self.state.is_loading = false;
        self.state.is_error = completion.outcome.is_err();

        match completion.outcome {
            Ok(reply) => {
                let reply = reply.trim();
                self.state.response = format!("{}{}", self.persona.speaker_label, reply);
                info!(
                    request_id = %completion.request_id,
                    chars = reply.chars().count(),
                    "Reply received"
                );

                if self.state.voice_enabled && !reply.is_empty() {
                    self.speech.speak(Utterance::new(
                        reply,
                        self.state.mood.prosody(),
                        self.persona.language_tag.clone(),
                    ));
                }
            }
            Err(err) => {
                warn!(
                    request_id = %completion.request_id,
                    remote = err.is_remote(),
                    error = %err,
                    "Chat request failed"
                );
                self.state.response = err.display_message();
            }
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
