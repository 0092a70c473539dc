//! Error types for Tunegate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Request errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error was caused by the caller rather than the gateway.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
