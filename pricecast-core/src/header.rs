//! Wire frame header.
//!
//! Every protocol frame starts with the fixed 8-byte [`FrameHeader`]
//! followed by a fixed-layout payload for the message type. All fields are
//! little-endian.

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{CodecError, Result};

/// Protocol version this build encodes and accepts.
pub const PROTOCOL_VERSION: u16 = 1;

/// Fixed frame header preceding every message (8 bytes).
///
/// # Wire Format
/// ```text
/// +0: messageType    (u16, 2 bytes)
/// +2: version        (u16, 2 bytes)
/// +4: payloadLength  (u32, 4 bytes)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    /// Message type identifier, see [`crate::messages::message_type`].
    pub message_type: u16,
    /// Protocol version the frame was encoded with.
    pub version: u16,
    /// Length of the payload following the header, in bytes.
    pub payload_length: u32,
}

impl FrameHeader {
    /// Encoded length of the frame header in bytes.
    pub const ENCODED_LENGTH: usize = 8;

    /// Creates a header for the given message type and payload length,
    /// stamped with the current protocol version.
    #[must_use]
    pub const fn new(message_type: u16, payload_length: u32) -> Self {
        Self {
            message_type,
            version: PROTOCOL_VERSION,
            payload_length,
        }
    }

    /// Decodes the header at the start of the buffer.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferTooShort`] if fewer than 8 bytes are
    /// available, [`CodecError::UnsupportedVersion`] on a version mismatch.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        if buffer.len() < Self::ENCODED_LENGTH {
            return Err(CodecError::BufferTooShort {
                required: Self::ENCODED_LENGTH,
                available: buffer.len(),
            });
        }
        let header = Self {
            message_type: buffer.get_u16_le(0),
            version: buffer.get_u16_le(2),
            payload_length: buffer.get_u32_le(4),
        };
        if header.version != PROTOCOL_VERSION {
            return Err(CodecError::UnsupportedVersion {
                version: header.version,
                supported: PROTOCOL_VERSION,
            });
        }
        Ok(header)
    }

    /// Encodes the header to the buffer at the given offset.
    #[inline(always)]
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B, offset: usize) {
        buffer.put_u16_le(offset, self.message_type);
        buffer.put_u16_le(offset + 2, self.version);
        buffer.put_u32_le(offset + 4, self.payload_length);
    }

    /// Returns the total frame size (header + payload).
    #[must_use]
    pub const fn frame_size(&self) -> usize {
        Self::ENCODED_LENGTH + self.payload_length as usize
    }

    /// Validates that the framed payload matches an expected fixed size.
    ///
    /// # Errors
    /// Returns [`CodecError::PayloadLengthMismatch`] on disagreement and
    /// [`CodecError::BufferTooShort`] if the buffer does not hold the whole
    /// frame.
    pub fn expect_payload<B: ReadBuffer + ?Sized>(
        &self,
        buffer: &B,
        expected: usize,
    ) -> Result<()> {
        if self.payload_length as usize != expected {
            return Err(CodecError::PayloadLengthMismatch {
                expected,
                actual: self.payload_length as usize,
            });
        }
        if buffer.len() < self.frame_size() {
            return Err(CodecError::BufferTooShort {
                required: self.frame_size(),
                available: buffer.len(),
            });
        }
        Ok(())
    }
}
