//! Error types for Parley

use thiserror::Error;

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Parley
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential is absent from the environment
    #[error("{service} credential is missing: please set {var} in your environment variables")]
    MissingCredential {
        /// Service the credential belongs to
        service: &'static str,
        /// Environment variable that should hold it
        var: &'static str,
    },

    /// A credential is present but cannot be used as-is
    #[error("malformed credential {var}: {reason}")]
    MalformedCredential {
        /// Environment variable holding the bad value
        var: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Chat completion error
    #[error("LLM error: {0}")]
    Llm(String),

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
