//! Error types for the client engine.

use pricecast_core::Status;
use thiserror::Error;

/// Error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] pricecast_transport::TransportError),

    /// Wire codec error.
    #[error("codec error: {0}")]
    Codec(#[from] pricecast_core::CodecError),

    /// No snapshot response arrived within the configured retries.
    #[error("snapshot timed out after {attempts} attempts")]
    SnapshotTimeout {
        /// Number of requests sent before giving up.
        attempts: u32,
    },

    /// The server rejected a request.
    #[error("request rejected: {status:?}")]
    Rejected {
        /// Status carried in the response.
        status: Status,
    },

    /// The peer violated the protocol.
    #[error("protocol violation: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// The connection or feed ended.
    #[error("connection closed")]
    Closed,
}

impl ClientError {
    /// Creates a protocol violation error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}
