//! Error types for codec operations.

use thiserror::Error;

/// Error type for wire codec operations.
///
/// A codec error always means the offending frame is dropped; it is never
/// fatal to the path that observed it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer is too short for the requested operation.
    #[error("buffer too short: required {required} bytes, available {available} bytes")]
    BufferTooShort {
        /// Required buffer size in bytes.
        required: usize,
        /// Available buffer size in bytes.
        available: usize,
    },

    /// Message type did not match the expected decoder.
    #[error("message type mismatch: expected {expected}, actual {actual}")]
    TypeMismatch {
        /// Expected message type.
        expected: u16,
        /// Actual message type found.
        actual: u16,
    },

    /// Message type is not part of the protocol.
    #[error("unknown message type {message_type}")]
    UnknownMessageType {
        /// Message type found in the header.
        message_type: u16,
    },

    /// Header payload length disagrees with the fixed layout.
    #[error("payload length mismatch: expected {expected} bytes, actual {actual} bytes")]
    PayloadLengthMismatch {
        /// Expected payload length for the message type and entry count.
        expected: usize,
        /// Payload length carried by the header.
        actual: usize,
    },

    /// Status byte is not a known status code.
    #[error("invalid status value {value}")]
    InvalidStatus {
        /// Value found on the wire.
        value: u8,
    },

    /// Frame was produced by an incompatible protocol version.
    #[error("unsupported protocol version {version}, supported {supported}")]
    UnsupportedVersion {
        /// Version carried by the header.
        version: u16,
        /// Version this build speaks.
        supported: u16,
    },
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
