//! Speech output for assistant replies.
//!
//! Speech is fire-and-forget: [`SpeechOutput::speak`] returns immediately
//! and failures are logged, never reported back to the conversation.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::Command;

use lumen_core::config::{VoiceConfig, VoiceEngine};

use crate::error::ChatError;
use crate::mood::Prosody;

/// A single piece of text to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// 0.0-1.0, 0.5 is a normal speaking rate.
    pub rate: f32,
    /// Multiplier, 1.0 is neutral.
    pub pitch: f32,
    pub language_tag: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>, prosody: Prosody, language_tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: prosody.rate,
            pitch: prosody.pitch,
            language_tag: language_tag.into(),
        }
    }
}

/// Speech output collaborator.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, utterance: Utterance);
}

/// Speech output that only records utterances in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSpeech;

impl SpeechOutput for TracingSpeech {
    fn speak(&self, utterance: Utterance) {
        tracing::info!(
            rate = utterance.rate,
            pitch = utterance.pitch,
            language = %utterance.language_tag,
            chars = utterance.text.chars().count(),
            "Speaking reply"
        );
    }
}

/// Speech output backed by an external text-to-speech program.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    engine: VoiceEngine,
    program: String,
}

impl CommandSpeech {
    /// Create a command backend for `engine` using its default program name.
    pub fn new(engine: VoiceEngine) -> Result<Self, ChatError> {
        let program = match engine {
            VoiceEngine::Espeak => "espeak-ng",
            VoiceEngine::Say => "say",
            VoiceEngine::Log => {
                return Err(ChatError::Voice(
                    "the log engine does not run a command".to_string(),
                ))
            }
        };
        Ok(Self {
            engine,
            program: program.to_string(),
        })
    }

    /// Override the program path (e.g. an absolute path to `espeak-ng`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program for `utterance`.
    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        let wpm = words_per_minute(utterance.rate).to_string();
        match self.engine {
            VoiceEngine::Espeak => vec![
                "-s".to_string(),
                wpm,
                "-p".to_string(),
                espeak_pitch(utterance.pitch).to_string(),
                "-v".to_string(),
                utterance.language_tag.to_ascii_lowercase(),
                "--".to_string(),
                utterance.text.clone(),
            ],
            VoiceEngine::Say | VoiceEngine::Log => {
                vec!["-r".to_string(), wpm, "--".to_string(), utterance.text.clone()]
            }
        }
    }
}

impl SpeechOutput for CommandSpeech {
    fn speak(&self, utterance: Utterance) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(program = %self.program, "No Tokio runtime, utterance dropped");
            return;
        };
        let program = self.program.clone();
        let args = self.args(&utterance);

        // Detached: the speech process is never awaited by the conversation.
        runtime.spawn(async move {
            match run_speech(&program, &args).await {
                Ok(s) if s.success() => tracing::debug!(program = %program, "Speech finished"),
                Ok(s) => tracing::warn!(program = %program, status = %s, "Speech command failed"),
                Err(e) => tracing::warn!(program = %program, error = %e, "Failed to start speech command"),
            }
        });
    }
}

async fn run_speech(program: &str, args: &[String]) -> std::io::Result<ExitStatus> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
}

/// Build the speech backend selected in `[voice]`.
pub fn speech_from_config(config: &VoiceConfig) -> Result<Arc<dyn SpeechOutput>, ChatError> {
    match config.engine {
        VoiceEngine::Log => Ok(Arc::new(TracingSpeech)),
        engine => Ok(Arc::new(CommandSpeech::new(engine)?)),
    }
}

/// Map a 0.0-1.0 rate (0.5 normal) to words per minute.
fn words_per_minute(rate: f32) -> u32 {
    ((rate / 0.5) * 175.0).round().clamp(80.0, 450.0) as u32
}

/// Map a pitch multiplier to espeak's 0-99 scale (50 neutral).
fn espeak_pitch(pitch: f32) -> u32 {
    (pitch * 50.0).round().clamp(0.0, 99.0) as u32
}

// =============================================================================
// Tests
// =============================================================================
