//! Mood-aware conversation engine for Lumen.
//!
//! Classifies each message into a mood, sends it to a chat completions
//! endpoint, and speaks the reply with mood-tuned prosody.

pub mod client;
pub mod error;
pub mod mood;
pub mod orchestrator;
pub mod state;
pub mod types;
pub mod voice;

pub use client::{parse_reply, ChatClient, HttpChatClient};
pub use error::ChatError;
pub use mood::{classify, Mood, Prosody, Rgb};
pub use orchestrator::ConversationOrchestrator;
pub use state::ConversationState;
pub use types::{ChatMessage, ChatRequest, Persona, Role};
pub use voice::{speech_from_config, CommandSpeech, SpeechOutput, TracingSpeech, Utterance};
