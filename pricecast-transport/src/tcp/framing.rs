//! Wire-frame codec for TCP streams.
//!
//! Protocol frames are self-describing: the 8-byte frame header carries the
//! payload length, so stream framing reuses it instead of adding a second
//! length prefix. Decoded items are complete frames (header included), ready
//! for message-level decoding.

use crate::error::TransportError;
use bytes::{BufMut, BytesMut};
use pricecast_core::FrameHeader;
use tokio_util::codec::{Decoder, Encoder};

/// Length-delimited codec driven by the protocol's own frame header.
pub struct WireFrameCodec {
    max_frame_size: usize,
}

impl WireFrameCodec {
    /// Creates a new frame codec with the specified maximum frame size.
    ///
    /// # Arguments
    /// * `max_frame_size` - Maximum allowed frame size in bytes
    #[must_use]
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Returns the maximum frame size.
    #[must_use]
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for WireFrameCodec {
    fn default() -> Self {
        Self::new(64 * 1024) // 64KB default
    }
}

impl Decoder for WireFrameCodec {
    type Item = BytesMut;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < FrameHeader::ENCODED_LENGTH {
            return Ok(None);
        }

        // Validates the header (including protocol version) on every frame.
        let header = FrameHeader::decode(&src[..])?;
        let frame_size = header.frame_size();

        if frame_size > self.max_frame_size {
            return Err(TransportError::frame_too_large(
                frame_size,
                self.max_frame_size,
            ));
        }

        if src.len() < frame_size {
            src.reserve(frame_size - src.len());
            return Ok(None);
        }

        Ok(Some(src.split_to(frame_size)))
    }
}

impl Encoder<&[u8]> for WireFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(TransportError::frame_too_large(
                item.len(),
                self.max_frame_size,
            ));
        }

        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for WireFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&[u8]>>::encode(self, &item, dst)
    }
}

impl Encoder<Vec<u8>> for WireFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&[u8]>>::encode(self, &item, dst)
    }
}
