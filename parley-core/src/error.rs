//! Error types for parley

use thiserror::Error;

/// The main error type for parley operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Session state errors (e.g. input while a generation is in flight)
    #[error("Session error: {0}")]
    Session(String),

    /// Completion or summarization backend errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Event bus errors
    #[error("Bus error: {0}")]
    Bus(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for parley operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
