//! # pricecast Core
//!
//! Core types and the wire codec for the last-price distribution engine.
//!
//! This crate provides:
//! - Buffer traits for zero-copy read/write operations
//! - The fixed 8-byte frame header
//! - Fixed-layout message codecs (price updates, snapshot exchange, batch runs)
//! - Error types for encoding/decoding operations
//! - Aligned buffer implementations for optimal performance

pub mod buffer;
pub mod error;
pub mod header;
pub mod messages;
pub mod types;

pub use buffer::{AlignedBuffer, BufferPool, ReadBuffer, WriteBuffer};
pub use error::{CodecError, Result};
pub use header::{FrameHeader, PROTOCOL_VERSION};
pub use messages::{
    CancelBatchRequest, CancelBatchResponse, CompleteBatchRequest, CompleteBatchResponse,
    Message, PriceUpdate, SnapshotRequest, SnapshotResponse, StartBatchRequest,
    StartBatchResponse, Status, UploadChunkRequest, UploadChunkResponse, message_type,
};
pub use types::{InstrumentId, PriceRecord};
