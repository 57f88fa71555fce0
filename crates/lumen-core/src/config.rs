use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LumenError, Result};

/// Top-level configuration for the Lumen application.
///
/// Loaded from `~/.lumen/config.toml` by default. The API bearer token is
/// never part of this file; `chat.api_key_env` names the environment
/// variable it is read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LumenConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl LumenConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LumenConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Write this configuration to `path` unless an existing file there
    /// cannot be read back as configuration.
    pub fn write_initial(&self, path: &Path) -> Result<()> {
        if path.exists() {
            if let Err(e) = Self::load(path) {
                return Err(LumenError::Config(format!(
                    "refusing to overwrite {}: {}",
                    path.display(),
                    e
                )));
            }
        }
        self.save(path)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote chat endpoint and persona settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat completions endpoint (OpenAI-compatible).
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// System-role persona prompt.
    pub system_prompt: String,
    /// Label prefixed to every assistant reply shown to the user.
    pub speaker_label: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            system_prompt: "You are Lumen, a gentle and reflective companion. \
                            Answer with warmth and clarity, in a few sentences."
                .to_string(),
            speaker_label: "Lumen: ".to_string(),
            api_key_env: "LUMEN_API_KEY".to_string(),
        }
    }
}

impl ChatConfig {
    /// Read the bearer token from the environment variable named by
    /// `api_key_env`.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(|var| std::env::var(var).ok())
    }

    /// Resolve the bearer token through an arbitrary lookup.
    ///
    /// A missing or whitespace-only value is rejected.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(&self.api_key_env) {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(LumenError::MissingApiKey {
                var: self.api_key_env.clone(),
            }),
        }
    }
}

/// Speech output backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEngine {
    /// Log utterances through `tracing` only.
    #[default]
    Log,
    /// Speak through the `espeak-ng` command.
    Espeak,
    /// Speak through the macOS `say` command.
    Say,
}

impl fmt::Display for VoiceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceEngine::Log => write!(f, "log"),
            VoiceEngine::Espeak => write!(f, "espeak"),
            VoiceEngine::Say => write!(f, "say"),
        }
    }
}

impl std::str::FromStr for VoiceEngine {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(VoiceEngine::Log),
            "espeak" | "espeak-ng" => Ok(VoiceEngine::Espeak),
            "say" => Ok(VoiceEngine::Say),
            other => Err(LumenError::Config(format!("unknown voice engine: {}", other))),
        }
    }
}

/// Speech output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Whether replies are spoken at startup. Toggleable at runtime.
    pub enabled: bool,
    /// BCP 47 language tag passed to the speech engine.
    pub language_tag: String,
    /// Speech backend.
    pub engine: VoiceEngine,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language_tag: "en-US".to_string(),
            engine: VoiceEngine::Log,
        }
    }
}
