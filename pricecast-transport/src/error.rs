//! Error types for transport operations.

use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection timeout.
    #[error("connection timeout")]
    ConnectTimeout,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// A frame failed wire-format validation.
    #[error("codec error: {0}")]
    Codec(#[from] pricecast_core::CodecError),

    /// Frame too large.
    #[error("frame too large: {size} bytes exceeds maximum {max} bytes")]
    FrameTooLarge {
        /// Actual frame size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Multicast error.
    #[error("multicast error: {message}")]
    Multicast {
        /// Error message.
        message: String,
    },
}

impl TransportError {
    /// Creates a frame too large error.
    pub fn frame_too_large(size: usize, max: usize) -> Self {
        Self::FrameTooLarge { size, max }
    }

    /// Creates a multicast error.
    pub fn multicast(message: impl Into<String>) -> Self {
        Self::Multicast {
            message: message.into(),
        }
    }
}
