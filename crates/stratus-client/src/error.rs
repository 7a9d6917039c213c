//! Error types for the asynchronous client.

use thiserror::Error;

use stratus_core::TranslateError;

/// Errors returned by the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("connection closed")]
    Disconnected,
}

/// Errors returned by query execution and change flushing.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
