use thiserror::Error;

/// Top-level error type for Lumen configuration and startup.
///
/// Request-time failures live in `lumen_chat::ChatError`; this type covers
/// everything that can go wrong before the first message is sent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LumenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API key not set: environment variable {var} is missing or empty")]
    MissingApiKey { var: String },
}

impl From<toml::de::Error> for LumenError {
    fn from(err: toml::de::Error) -> Self {
        LumenError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LumenError {
    fn from(err: toml::ser::Error) -> Self {
        LumenError::Config(err.to_string())
    }
}

/// A specialized `Result` type for Lumen startup operations.
pub type Result<T> = std::result::Result<T, LumenError>;
