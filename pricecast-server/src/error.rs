//! Error types for the server engine.

use thiserror::Error;

/// Error type for server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Wire codec error.
    #[error("codec error: {0}")]
    Codec(#[from] pricecast_core::CodecError),

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
