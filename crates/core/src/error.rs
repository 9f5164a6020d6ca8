//! Error types for the portrait-core library.
//!
//! The enhancement pipeline distinguishes three closed failure kinds
//! ([`AppError::Transport`], [`AppError::EmptyResult`], [`AppError::Encoding`]);
//! the remaining variants cover configuration, I/O and UI plumbing.

use thiserror::Error;

/// Errors that can occur within the portrait-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid base URL, bad model name).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external call failed outright: network, auth, quota or a
    /// non-success HTTP status.
    #[error("Enhancement service error: {0}")]
    Transport(String),

    /// The service answered but no candidate carried inline image data.
    #[error("Model did not return an enhanced image")]
    EmptyResult,

    /// Bytes could not be turned into (or recovered from) a data URI.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// UI-related errors (window creation, texture upload).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an encoding error with the given message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
