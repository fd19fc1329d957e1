//! Fixed-layout protocol messages.
//!
//! Three message kinds carry the last-price distribution protocol itself
//! (incremental updates plus the snapshot exchange); the batch-run set lets
//! a producer stage a block of prices and merge it in one request cycle.
//!
//! Every frame is [`FrameHeader`] + a fixed payload; decoding validates the
//! header payload length against the expected size, so a malformed frame is
//! a recoverable [`CodecError`], never a panic.

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::header::FrameHeader;
use crate::types::PriceRecord;

/// Message type identifiers.
pub mod message_type {
    /// Incremental price update on the feed channel.
    pub const PRICE_UPDATE: u16 = 1;
    /// Snapshot request on the point-to-point channel.
    pub const SNAPSHOT_REQUEST: u16 = 2;
    /// Snapshot response on the point-to-point channel.
    pub const SNAPSHOT_RESPONSE: u16 = 3;

    /// Opens a batch run.
    pub const START_BATCH_REQUEST: u16 = 10;
    /// Carries the id of a freshly opened batch run.
    pub const START_BATCH_RESPONSE: u16 = 11;
    /// Stages a chunk of records into a batch run.
    pub const UPLOAD_CHUNK_REQUEST: u16 = 12;
    /// Acknowledges (or rejects) a staged chunk.
    pub const UPLOAD_CHUNK_RESPONSE: u16 = 13;
    /// Merges a batch run into the live store.
    pub const COMPLETE_BATCH_REQUEST: u16 = 14;
    /// Acknowledges a batch merge.
    pub const COMPLETE_BATCH_RESPONSE: u16 = 15;
    /// Discards a batch run.
    pub const CANCEL_BATCH_REQUEST: u16 = 16;
    /// Acknowledges a batch discard.
    pub const CANCEL_BATCH_RESPONSE: u16 = 17;
}

/// Response status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Request succeeded.
    Ok = 0,
    /// The referenced batch run does not exist (or was evicted).
    BatchNotFound = 1,
    /// A record referenced an instrument outside the configured universe.
    UnknownInstrument = 2,
    /// No capacity for another batch run.
    CapacityExhausted = 3,
}

impl Status {
    /// Decodes a status byte.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidStatus`] for unknown values.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Ok),
            1 => Ok(Self::BatchNotFound),
            2 => Ok(Self::UnknownInstrument),
            3 => Ok(Self::CapacityExhausted),
            _ => Err(CodecError::InvalidStatus { value }),
        }
    }
}

/// Checks the buffer can hold `required` bytes before encoding into it.
fn check_capacity<B: ReadBuffer + ?Sized>(buffer: &B, required: usize) -> Result<()> {
    if buffer.len() < required {
        return Err(CodecError::BufferTooShort {
            required,
            available: buffer.len(),
        });
    }
    Ok(())
}

/// Decodes and type-checks the header of an inbound frame.
fn expect_header<B: ReadBuffer + ?Sized>(buffer: &B, expected: u16) -> Result<FrameHeader> {
    let header = FrameHeader::decode(buffer)?;
    if header.message_type != expected {
        return Err(CodecError::TypeMismatch {
            expected,
            actual: header.message_type,
        });
    }
    Ok(header)
}

/// Encodes an 8-byte status payload: status (1) + padding (7).
fn encode_status_frame<B: WriteBuffer + ?Sized>(
    buffer: &mut B,
    message_type: u16,
    status: Status,
) -> Result<usize> {
    const PAYLOAD: usize = 8;
    let total = FrameHeader::ENCODED_LENGTH + PAYLOAD;
    check_capacity(buffer, total)?;
    FrameHeader::new(message_type, PAYLOAD as u32).encode(buffer, 0);
    buffer.put_u8(FrameHeader::ENCODED_LENGTH, status as u8);
    buffer.zero(FrameHeader::ENCODED_LENGTH + 1, 7);
    Ok(total)
}

fn decode_status_frame<B: ReadBuffer + ?Sized>(buffer: &B, message_type: u16) -> Result<Status> {
    let header = expect_header(buffer, message_type)?;
    header.expect_payload(buffer, 8)?;
    Status::from_u8(buffer.get_u8(FrameHeader::ENCODED_LENGTH))
}

fn encode_batch_id_frame<B: WriteBuffer + ?Sized>(
    buffer: &mut B,
    message_type: u16,
    batch_id: u64,
) -> Result<usize> {
    const PAYLOAD: usize = 8;
    let total = FrameHeader::ENCODED_LENGTH + PAYLOAD;
    check_capacity(buffer, total)?;
    FrameHeader::new(message_type, PAYLOAD as u32).encode(buffer, 0);
    buffer.put_u64_le(FrameHeader::ENCODED_LENGTH, batch_id);
    Ok(total)
}

fn decode_batch_id_frame<B: ReadBuffer + ?Sized>(buffer: &B, message_type: u16) -> Result<u64> {
    let header = expect_header(buffer, message_type)?;
    header.expect_payload(buffer, 8)?;
    Ok(buffer.get_u64_le(FrameHeader::ENCODED_LENGTH))
}

/// Incremental price update, published on the feed channel.
///
/// Producers publish with `record.sequence == 0`; the ingest path republishes
/// with the assigned per-instrument sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceUpdate {
    /// The priced observation.
    pub record: PriceRecord,
}

impl PriceUpdate {
    /// Payload length in bytes.
    pub const PAYLOAD_LENGTH: usize = PriceRecord::ENCODED_LENGTH;
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_LENGTH;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        check_capacity(buffer, Self::FRAME_LENGTH)?;
        FrameHeader::new(message_type::PRICE_UPDATE, Self::PAYLOAD_LENGTH as u32)
            .encode(buffer, 0);
        self.record.encode(buffer, FrameHeader::ENCODED_LENGTH);
        Ok(Self::FRAME_LENGTH)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a short buffer, wrong message type or
    /// payload length mismatch.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = expect_header(buffer, message_type::PRICE_UPDATE)?;
        header.expect_payload(buffer, Self::PAYLOAD_LENGTH)?;
        Ok(Self {
            record: PriceRecord::decode(buffer, FrameHeader::ENCODED_LENGTH),
        })
    }
}

/// Snapshot request, sent on the point-to-point channel.
///
/// Each retry carries a fresh `request_id`; the server keeps no per-request
/// state, so repeated requests are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotRequest {
    /// Correlation id chosen by the consumer.
    pub request_id: u64,
}

impl SnapshotRequest {
    /// Payload length in bytes.
    pub const PAYLOAD_LENGTH: usize = 8;
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_LENGTH;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        check_capacity(buffer, Self::FRAME_LENGTH)?;
        FrameHeader::new(message_type::SNAPSHOT_REQUEST, Self::PAYLOAD_LENGTH as u32)
            .encode(buffer, 0);
        buffer.put_u64_le(FrameHeader::ENCODED_LENGTH, self.request_id);
        Ok(Self::FRAME_LENGTH)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a short buffer, wrong message type or
    /// payload length mismatch.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = expect_header(buffer, message_type::SNAPSHOT_REQUEST)?;
        header.expect_payload(buffer, Self::PAYLOAD_LENGTH)?;
        Ok(Self {
            request_id: buffer.get_u64_le(FrameHeader::ENCODED_LENGTH),
        })
    }
}

/// Snapshot response: the full last-value state as of the serving instant.
///
/// Entries carry the stamped per-instrument sequence, which doubles as the
/// high-water marker set the consumer reconciles incrementals against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotResponse {
    /// Correlation id echoed from the request.
    pub request_id: u64,
    /// One record per populated instrument slot; may be empty.
    pub entries: Vec<PriceRecord>,
}

impl SnapshotResponse {
    /// Fixed payload prefix: request_id (8) + entry_count (4) + padding (4).
    pub const PAYLOAD_PREFIX: usize = 16;

    /// Total encoded frame length for this response.
    #[must_use]
    pub fn frame_length(&self) -> usize {
        FrameHeader::ENCODED_LENGTH
            + Self::PAYLOAD_PREFIX
            + self.entries.len() * PriceRecord::ENCODED_LENGTH
    }

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        let total = self.frame_length();
        check_capacity(buffer, total)?;
        let payload = total - FrameHeader::ENCODED_LENGTH;
        FrameHeader::new(message_type::SNAPSHOT_RESPONSE, payload as u32).encode(buffer, 0);
        let mut offset = FrameHeader::ENCODED_LENGTH;
        buffer.put_u64_le(offset, self.request_id);
        buffer.put_u32_le(offset + 8, self.entries.len() as u32);
        buffer.put_u32_le(offset + 12, 0);
        offset += Self::PAYLOAD_PREFIX;
        for entry in &self.entries {
            entry.encode(buffer, offset);
            offset += PriceRecord::ENCODED_LENGTH;
        }
        Ok(total)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// The payload length is validated against the declared entry count, so
    /// a truncated or padded frame is rejected rather than misread.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a short buffer, wrong message type or
    /// payload length mismatch.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = expect_header(buffer, message_type::SNAPSHOT_RESPONSE)?;
        if (header.payload_length as usize) < Self::PAYLOAD_PREFIX {
            return Err(CodecError::PayloadLengthMismatch {
                expected: Self::PAYLOAD_PREFIX,
                actual: header.payload_length as usize,
            });
        }
        let entry_count = {
            check_capacity(buffer, FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_PREFIX)?;
            buffer.get_u32_le(FrameHeader::ENCODED_LENGTH + 8) as usize
        };
        let expected = Self::PAYLOAD_PREFIX + entry_count * PriceRecord::ENCODED_LENGTH;
        header.expect_payload(buffer, expected)?;

        let request_id = buffer.get_u64_le(FrameHeader::ENCODED_LENGTH);
        let mut entries = Vec::with_capacity(entry_count);
        let mut offset = FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_PREFIX;
        for _ in 0..entry_count {
            entries.push(PriceRecord::decode(buffer, offset));
            offset += PriceRecord::ENCODED_LENGTH;
        }
        Ok(Self {
            request_id,
            entries,
        })
    }
}

/// Opens a new batch run. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartBatchRequest;

impl StartBatchRequest {
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        check_capacity(buffer, Self::FRAME_LENGTH)?;
        FrameHeader::new(message_type::START_BATCH_REQUEST, 0).encode(buffer, 0);
        Ok(Self::FRAME_LENGTH)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a short buffer, wrong message type or
    /// payload length mismatch.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = expect_header(buffer, message_type::START_BATCH_REQUEST)?;
        header.expect_payload(buffer, 0)?;
        Ok(Self)
    }
}

/// Response to [`StartBatchRequest`]; `batch_id` is valid when `status == Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartBatchResponse {
    /// Outcome of the request.
    pub status: Status,
    /// Identifier of the opened batch run, 0 when rejected.
    pub batch_id: u64,
}

impl StartBatchResponse {
    /// Payload length in bytes: status (1) + padding (7) + batch_id (8).
    pub const PAYLOAD_LENGTH: usize = 16;
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_LENGTH;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        check_capacity(buffer, Self::FRAME_LENGTH)?;
        FrameHeader::new(
            message_type::START_BATCH_RESPONSE,
            Self::PAYLOAD_LENGTH as u32,
        )
        .encode(buffer, 0);
        buffer.put_u8(FrameHeader::ENCODED_LENGTH, self.status as u8);
        buffer.zero(FrameHeader::ENCODED_LENGTH + 1, 7);
        buffer.put_u64_le(FrameHeader::ENCODED_LENGTH + 8, self.batch_id);
        Ok(Self::FRAME_LENGTH)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a short buffer, wrong message type,
    /// payload length mismatch or unknown status byte.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = expect_header(buffer, message_type::START_BATCH_RESPONSE)?;
        header.expect_payload(buffer, Self::PAYLOAD_LENGTH)?;
        Ok(Self {
            status: Status::from_u8(buffer.get_u8(FrameHeader::ENCODED_LENGTH))?,
            batch_id: buffer.get_u64_le(FrameHeader::ENCODED_LENGTH + 8),
        })
    }
}

/// Stages a chunk of price records into an open batch run.
///
/// Records are staged with producer timestamps only; sequence stamping
/// happens when the batch completes and merges through the ingest path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadChunkRequest {
    /// Batch run to stage into.
    pub batch_id: u64,
    /// Records in the chunk; may span a subset of the universe.
    pub records: Vec<PriceRecord>,
}

impl UploadChunkRequest {
    /// Fixed payload prefix: batch_id (8) + record_count (4) + padding (4).
    pub const PAYLOAD_PREFIX: usize = 16;

    /// Total encoded frame length for this request.
    #[must_use]
    pub fn frame_length(&self) -> usize {
        FrameHeader::ENCODED_LENGTH
            + Self::PAYLOAD_PREFIX
            + self.records.len() * PriceRecord::ENCODED_LENGTH
    }

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        let total = self.frame_length();
        check_capacity(buffer, total)?;
        let payload = total - FrameHeader::ENCODED_LENGTH;
        FrameHeader::new(message_type::UPLOAD_CHUNK_REQUEST, payload as u32).encode(buffer, 0);
        let mut offset = FrameHeader::ENCODED_LENGTH;
        buffer.put_u64_le(offset, self.batch_id);
        buffer.put_u32_le(offset + 8, self.records.len() as u32);
        buffer.put_u32_le(offset + 12, 0);
        offset += Self::PAYLOAD_PREFIX;
        for record in &self.records {
            record.encode(buffer, offset);
            offset += PriceRecord::ENCODED_LENGTH;
        }
        Ok(total)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a short buffer, wrong message type or
    /// payload length mismatch against the declared record count.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = expect_header(buffer, message_type::UPLOAD_CHUNK_REQUEST)?;
        if (header.payload_length as usize) < Self::PAYLOAD_PREFIX {
            return Err(CodecError::PayloadLengthMismatch {
                expected: Self::PAYLOAD_PREFIX,
                actual: header.payload_length as usize,
            });
        }
        check_capacity(buffer, FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_PREFIX)?;
        let record_count = buffer.get_u32_le(FrameHeader::ENCODED_LENGTH + 8) as usize;
        let expected = Self::PAYLOAD_PREFIX + record_count * PriceRecord::ENCODED_LENGTH;
        header.expect_payload(buffer, expected)?;

        let batch_id = buffer.get_u64_le(FrameHeader::ENCODED_LENGTH);
        let mut records = Vec::with_capacity(record_count);
        let mut offset = FrameHeader::ENCODED_LENGTH + Self::PAYLOAD_PREFIX;
        for _ in 0..record_count {
            records.push(PriceRecord::decode(buffer, offset));
            offset += PriceRecord::ENCODED_LENGTH;
        }
        Ok(Self { batch_id, records })
    }
}

/// Response to [`UploadChunkRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadChunkResponse {
    /// Outcome; a rejected chunk leaves the batch run unchanged.
    pub status: Status,
}

impl UploadChunkResponse {
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + 8;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        encode_status_frame(buffer, message_type::UPLOAD_CHUNK_RESPONSE, self.status)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a malformed frame or unknown status.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        Ok(Self {
            status: decode_status_frame(buffer, message_type::UPLOAD_CHUNK_RESPONSE)?,
        })
    }
}

/// Merges a batch run into the live store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompleteBatchRequest {
    /// Batch run to merge.
    pub batch_id: u64,
}

impl CompleteBatchRequest {
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + 8;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        encode_batch_id_frame(buffer, message_type::COMPLETE_BATCH_REQUEST, self.batch_id)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a malformed frame.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        Ok(Self {
            batch_id: decode_batch_id_frame(buffer, message_type::COMPLETE_BATCH_REQUEST)?,
        })
    }
}

/// Response to [`CompleteBatchRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteBatchResponse {
    /// Outcome of the merge.
    pub status: Status,
}

impl CompleteBatchResponse {
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + 8;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        encode_status_frame(buffer, message_type::COMPLETE_BATCH_RESPONSE, self.status)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a malformed frame or unknown status.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        Ok(Self {
            status: decode_status_frame(buffer, message_type::COMPLETE_BATCH_RESPONSE)?,
        })
    }
}

/// Discards a batch run without merging it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CancelBatchRequest {
    /// Batch run to discard.
    pub batch_id: u64,
}

impl CancelBatchRequest {
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + 8;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        encode_batch_id_frame(buffer, message_type::CANCEL_BATCH_REQUEST, self.batch_id)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a malformed frame.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        Ok(Self {
            batch_id: decode_batch_id_frame(buffer, message_type::CANCEL_BATCH_REQUEST)?,
        })
    }
}

/// Response to [`CancelBatchRequest`]. Cancelling an unknown batch is `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelBatchResponse {
    /// Outcome of the discard.
    pub status: Status,
}

impl CancelBatchResponse {
    /// Total encoded frame length in bytes.
    pub const FRAME_LENGTH: usize = FrameHeader::ENCODED_LENGTH + 8;

    /// Encodes the full frame at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if the buffer cannot hold the
    /// frame.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<usize> {
        encode_status_frame(buffer, message_type::CANCEL_BATCH_RESPONSE, self.status)
    }

    /// Decodes a frame from the start of the buffer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on a malformed frame or unknown status.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        Ok(Self {
            status: decode_status_frame(buffer, message_type::CANCEL_BATCH_RESPONSE)?,
        })
    }
}

/// Any protocol message, decoded by header message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Incremental price update.
    PriceUpdate(PriceUpdate),
    /// Snapshot request.
    SnapshotRequest(SnapshotRequest),
    /// Snapshot response.
    SnapshotResponse(SnapshotResponse),
    /// Batch open request.
    StartBatch(StartBatchRequest),
    /// Batch open response.
    StartBatchAck(StartBatchResponse),
    /// Chunk staging request.
    UploadChunk(UploadChunkRequest),
    /// Chunk staging response.
    UploadChunkAck(UploadChunkResponse),
    /// Batch merge request.
    CompleteBatch(CompleteBatchRequest),
    /// Batch merge response.
    CompleteBatchAck(CompleteBatchResponse),
    /// Batch discard request.
    CancelBatch(CancelBatchRequest),
    /// Batch discard response.
    CancelBatchAck(CancelBatchResponse),
}

impl Message {
    /// Decodes any protocol frame by dispatching on the header type.
    ///
    /// # Errors
    /// Returns [`CodecError::UnknownMessageType`] for types outside the
    /// protocol, or the underlying codec error for a malformed frame.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        let header = FrameHeader::decode(buffer)?;
        match header.message_type {
            message_type::PRICE_UPDATE => Ok(Self::PriceUpdate(PriceUpdate::decode(buffer)?)),
            message_type::SNAPSHOT_REQUEST => {
                Ok(Self::SnapshotRequest(SnapshotRequest::decode(buffer)?))
            }
            message_type::SNAPSHOT_RESPONSE => {
                Ok(Self::SnapshotResponse(SnapshotResponse::decode(buffer)?))
            }
            message_type::START_BATCH_REQUEST => {
                Ok(Self::StartBatch(StartBatchRequest::decode(buffer)?))
            }
            message_type::START_BATCH_RESPONSE => {
                Ok(Self::StartBatchAck(StartBatchResponse::decode(buffer)?))
            }
            message_type::UPLOAD_CHUNK_REQUEST => {
                Ok(Self::UploadChunk(UploadChunkRequest::decode(buffer)?))
            }
            message_type::UPLOAD_CHUNK_RESPONSE => {
                Ok(Self::UploadChunkAck(UploadChunkResponse::decode(buffer)?))
            }
            message_type::COMPLETE_BATCH_REQUEST => {
                Ok(Self::CompleteBatch(CompleteBatchRequest::decode(buffer)?))
            }
            message_type::COMPLETE_BATCH_RESPONSE => Ok(Self::CompleteBatchAck(
                CompleteBatchResponse::decode(buffer)?,
            )),
            message_type::CANCEL_BATCH_REQUEST => {
                Ok(Self::CancelBatch(CancelBatchRequest::decode(buffer)?))
            }
            message_type::CANCEL_BATCH_RESPONSE => {
                Ok(Self::CancelBatchAck(CancelBatchResponse::decode(buffer)?))
            }
            other => Err(CodecError::UnknownMessageType {
                message_type: other,
            }),
        }
    }

    /// Returns the wire message type of this message.
    #[must_use]
    pub fn message_type(&self) -> u16 {
        match self {
            Self::PriceUpdate(_) => message_type::PRICE_UPDATE,
            Self::SnapshotRequest(_) => message_type::SNAPSHOT_REQUEST,
            Self::SnapshotResponse(_) => message_type::SNAPSHOT_RESPONSE,
            Self::StartBatch(_) => message_type::START_BATCH_REQUEST,
            Self::StartBatchAck(_) => message_type::START_BATCH_RESPONSE,
            Self::UploadChunk(_) => message_type::UPLOAD_CHUNK_REQUEST,
            Self::UploadChunkAck(_) => message_type::UPLOAD_CHUNK_RESPONSE,
            Self::CompleteBatch(_) => message_type::COMPLETE_BATCH_REQUEST,
            Self::CompleteBatchAck(_) => message_type::COMPLETE_BATCH_RESPONSE,
            Self::CancelBatch(_) => message_type::CANCEL_BATCH_REQUEST,
            Self::CancelBatchAck(_) => message_type::CANCEL_BATCH_RESPONSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AlignedBuffer;

    fn record(id: u32, seq: u64, price: i64, ts: u64) -> PriceRecord {
        PriceRecord {
            instrument_id: id,
            sequence: seq,
            price,
            source_timestamp: ts,
        }
    }

    #[test]
    fn test_price_update_round_trip() {
        let update = PriceUpdate {
            record: record(3, 17, 101_500, 42),
        };

        let mut buf: AlignedBuffer<64> = AlignedBuffer::new();
        let len = update.encode(&mut buf).unwrap();
        assert_eq!(len, PriceUpdate::FRAME_LENGTH);
        assert_eq!(PriceUpdate::decode(&buf).unwrap(), update);
    }

    #[test]
    fn test_encode_into_stack_array() {
        // Fixed-length frames go out through stack buffers on the hot path.
        let update = PriceUpdate {
            record: record(9, 0, 77, 5),
        };
        let mut buf = [0u8; PriceUpdate::FRAME_LENGTH];
        update.encode(&mut buf).unwrap();
        assert_eq!(PriceUpdate::decode(&buf[..]).unwrap(), update);

        let request = CompleteBatchRequest { batch_id: 12 };
        let mut buf = [0u8; CompleteBatchRequest::FRAME_LENGTH];
        request.encode(&mut buf).unwrap();
        assert_eq!(CompleteBatchRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_price_update_negative_price() {
        let update = PriceUpdate {
            record: record(1, 1, -99, 1),
        };
        let mut buf = vec![0u8; PriceUpdate::FRAME_LENGTH];
        update.encode(&mut buf).unwrap();
        assert_eq!(PriceUpdate::decode(&buf).unwrap().record.price, -99);
    }

    #[test]
    fn test_snapshot_request_round_trip() {
        let request = SnapshotRequest { request_id: 7 };
        let mut buf = vec![0u8; SnapshotRequest::FRAME_LENGTH];
        request.encode(&mut buf).unwrap();
        assert_eq!(SnapshotRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_snapshot_response_round_trip_empty() {
        let response = SnapshotResponse {
            request_id: 7,
            entries: Vec::new(),
        };
        let mut buf = vec![0u8; response.frame_length()];
        response.encode(&mut buf).unwrap();

        let decoded = SnapshotResponse::decode(&buf).unwrap();
        assert_eq!(decoded.request_id, 7);
        assert!(decoded.entries.is_empty());
    }

    #[test]
    fn test_snapshot_response_round_trip_entries() {
        let response = SnapshotResponse {
            request_id: 99,
            entries: vec![record(1, 5, 100, 10), record(2, 3, -200, 11)],
        };
        let mut buf = vec![0u8; response.frame_length()];
        response.encode(&mut buf).unwrap();
        assert_eq!(SnapshotResponse::decode(&buf).unwrap(), response);
    }

    #[test]
    fn test_snapshot_response_length_mismatch() {
        let response = SnapshotResponse {
            request_id: 1,
            entries: vec![record(1, 1, 1, 1)],
        };
        let mut buf = vec![0u8; response.frame_length()];
        response.encode(&mut buf).unwrap();

        // Claim two entries while only one is present.
        buf.put_u32_le(FrameHeader::ENCODED_LENGTH + 8, 2);
        assert!(matches!(
            SnapshotResponse::decode(&buf).unwrap_err(),
            CodecError::PayloadLengthMismatch { .. }
        ));
    }

    #[test]
    fn test_truncated_frame_is_error_not_panic() {
        let update = PriceUpdate {
            record: record(3, 17, 101_500, 42),
        };
        let mut buf = vec![0u8; PriceUpdate::FRAME_LENGTH];
        update.encode(&mut buf).unwrap();
        buf.truncate(20);

        assert!(matches!(
            PriceUpdate::decode(&buf).unwrap_err(),
            CodecError::BufferTooShort { .. }
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let request = SnapshotRequest { request_id: 1 };
        let mut buf = vec![0u8; SnapshotRequest::FRAME_LENGTH];
        request.encode(&mut buf).unwrap();

        assert_eq!(
            PriceUpdate::decode(&buf).unwrap_err(),
            CodecError::TypeMismatch {
                expected: message_type::PRICE_UPDATE,
                actual: message_type::SNAPSHOT_REQUEST
            }
        );
    }

    #[test]
    fn test_encode_into_short_buffer() {
        let update = PriceUpdate::default();
        let mut buf = vec![0u8; 8];
        assert!(matches!(
            update.encode(&mut buf).unwrap_err(),
            CodecError::BufferTooShort { .. }
        ));
    }

    #[test]
    fn test_start_batch_round_trip() {
        let mut buf = vec![0u8; StartBatchRequest::FRAME_LENGTH];
        StartBatchRequest.encode(&mut buf).unwrap();
        assert_eq!(StartBatchRequest::decode(&buf).unwrap(), StartBatchRequest);

        let response = StartBatchResponse {
            status: Status::Ok,
            batch_id: 12,
        };
        let mut buf = vec![0u8; StartBatchResponse::FRAME_LENGTH];
        response.encode(&mut buf).unwrap();
        assert_eq!(StartBatchResponse::decode(&buf).unwrap(), response);
    }

    #[test]
    fn test_upload_chunk_round_trip() {
        let request = UploadChunkRequest {
            batch_id: 5,
            records: vec![record(1, 0, 10, 100), record(2, 0, 20, 101)],
        };
        let mut buf = vec![0u8; request.frame_length()];
        request.encode(&mut buf).unwrap();
        assert_eq!(UploadChunkRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_upload_chunk_empty_round_trip() {
        let request = UploadChunkRequest {
            batch_id: 5,
            records: Vec::new(),
        };
        let mut buf = vec![0u8; request.frame_length()];
        request.encode(&mut buf).unwrap();
        assert_eq!(UploadChunkRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_status_frames_round_trip() {
        for status in [
            Status::Ok,
            Status::BatchNotFound,
            Status::UnknownInstrument,
            Status::CapacityExhausted,
        ] {
            let response = UploadChunkResponse { status };
            let mut buf = vec![0u8; UploadChunkResponse::FRAME_LENGTH];
            response.encode(&mut buf).unwrap();
            assert_eq!(UploadChunkResponse::decode(&buf).unwrap(), response);
        }

        let complete = CompleteBatchResponse { status: Status::Ok };
        let mut buf = vec![0u8; CompleteBatchResponse::FRAME_LENGTH];
        complete.encode(&mut buf).unwrap();
        assert_eq!(CompleteBatchResponse::decode(&buf).unwrap(), complete);

        let cancel = CancelBatchResponse { status: Status::Ok };
        let mut buf = vec![0u8; CancelBatchResponse::FRAME_LENGTH];
        cancel.encode(&mut buf).unwrap();
        assert_eq!(CancelBatchResponse::decode(&buf).unwrap(), cancel);
    }

    #[test]
    fn test_batch_id_frames_round_trip() {
        let complete = CompleteBatchRequest { batch_id: 44 };
        let mut buf = vec![0u8; CompleteBatchRequest::FRAME_LENGTH];
        complete.encode(&mut buf).unwrap();
        assert_eq!(CompleteBatchRequest::decode(&buf).unwrap(), complete);

        let cancel = CancelBatchRequest { batch_id: 44 };
        let mut buf = vec![0u8; CancelBatchRequest::FRAME_LENGTH];
        cancel.encode(&mut buf).unwrap();
        assert_eq!(CancelBatchRequest::decode(&buf).unwrap(), cancel);
    }

    #[test]
    fn test_invalid_status() {
        let response = UploadChunkResponse { status: Status::Ok };
        let mut buf = vec![0u8; UploadChunkResponse::FRAME_LENGTH];
        response.encode(&mut buf).unwrap();
        buf.put_u8(FrameHeader::ENCODED_LENGTH, 200);

        assert_eq!(
            UploadChunkResponse::decode(&buf).unwrap_err(),
            CodecError::InvalidStatus { value: 200 }
        );
    }

    #[test]
    fn test_message_dispatch() {
        let update = PriceUpdate {
            record: record(9, 2, 500, 3),
        };
        let mut buf = vec![0u8; PriceUpdate::FRAME_LENGTH];
        update.encode(&mut buf).unwrap();

        match Message::decode(&buf).unwrap() {
            Message::PriceUpdate(decoded) => assert_eq!(decoded, update),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_message_unknown_type() {
        let mut buf = vec![0u8; 8];
        FrameHeader::new(222, 0).encode(&mut buf, 0);
        assert_eq!(
            Message::decode(&buf).unwrap_err(),
            CodecError::UnknownMessageType { message_type: 222 }
        );
    }
}
