//! Error types for the Parley gateway

use thiserror::Error;

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Parley gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Empty or otherwise unusable caller input
    #[error("{0}")]
    Validation(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Generative language model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// An external call exceeded its time budget
    #[error("timed out: {0}")]
    Timeout(String),

    /// Base64 payload from a provider could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the caller caused this error (as opposed to a provider or the gateway)
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_client_error() {
        assert!(Error::Validation("empty".to_string()).is_client_error());
        assert!(!Error::Stt("down".to_string()).is_client_error());
        assert!(!Error::Timeout("stt".to_string()).is_client_error());
    }

    #[test]
    fn validation_message_is_bare() {
        let err = Error::Validation("Could not understand audio".to_string());
        assert_eq!(err.to_string(), "Could not understand audio");
    }
}
