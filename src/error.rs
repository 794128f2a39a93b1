//! Error types for the Solace voice engine

use thiserror::Error;

/// Result type alias for Solace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice engine
///
/// None of these are fatal to a running session: adapter failures are
/// captured into the session's `last_error` and the caller may retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone permission denied (recoverable, user must re-grant)
    #[error("microphone permission denied: {0}")]
    Permission(String),

    /// Speech capability not supported by the host environment
    #[error("speech capability unavailable: {0}")]
    AdapterUnavailable(String),

    /// Transient speech recognition failure
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Transient speech synthesis failure
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Response generator failed or timed out
    #[error("response generation error: {0}")]
    ResponseGeneration(String),

    /// Invalid session operation (e.g. listening while in text mode)
    #[error("session error: {0}")]
    Session(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

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

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
