//! CLI argument definitions for the Lumen application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;
use lumen_core::config::{LumenConfig, VoiceEngine};

/// Lumen: a mood-aware conversational companion for the terminal.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Model name sent to the chat endpoint.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Start with spoken replies turned off.
    #[arg(long = "no-voice")]
    pub no_voice: bool,

    /// Speech backend (log, espeak, say).
    #[arg(long = "voice-engine")]
    pub voice_engine: Option<VoiceEngine>,

    /// Send a single message, print the reply and exit.
    #[arg(short = 'p', long = "prompt")]
    pub prompt: Option<String>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "init-config")]
    pub init_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > LUMEN_CONFIG env var > platform default (~/.lumen/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("LUMEN_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config: &LumenConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut LumenConfig) {
        if let Some(ref model) = self.model {
            config.chat.model = model.clone();
        }
        if self.no_voice {
            config.voice.enabled = false;
        }
        if let Some(engine) = self.voice_engine {
            config.voice.engine = engine;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".lumen").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".lumen").join("config.toml");
    }
    PathBuf::from("config.toml")
}
