pub mod config;
pub mod error;

pub use config::{ChatConfig, GeneralConfig, LumenConfig, VoiceConfig, VoiceEngine};
pub use error::{LumenError, Result};
