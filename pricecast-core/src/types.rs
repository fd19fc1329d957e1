//! Domain primitives shared by the codec and the store.

use crate::buffer::{ReadBuffer, WriteBuffer};

/// Opaque fixed-width instrument identifier.
///
/// Assigned by the operator of the system; never reused for a different
/// instrument within a running deployment.
pub type InstrumentId = u32;

/// A single priced observation for one instrument.
///
/// This is both the wire layout of an incremental update payload and the
/// unit carried inside snapshot responses and batch chunks. `price` is a
/// fixed-point integer; the scale is an out-of-band deployment convention.
///
/// `sequence` is stamped by the ingest path; producers send 0.
///
/// # Wire Format (32 bytes)
/// ```text
/// +0:  instrumentId     (u32)
/// +4:  (padding)        (u32)
/// +8:  sequence         (u64)
/// +16: price            (i64, fixed-point)
/// +24: sourceTimestamp  (u64, nanoseconds)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceRecord {
    /// Instrument the price belongs to.
    pub instrument_id: InstrumentId,
    /// Per-instrument monotonic sequence, 0 before ingest stamping.
    pub sequence: u64,
    /// Fixed-point price.
    pub price: i64,
    /// Producer-side observation timestamp, nanoseconds.
    pub source_timestamp: u64,
}

impl PriceRecord {
    /// Encoded length of a price record in bytes.
    pub const ENCODED_LENGTH: usize = 32;

    /// Encodes the record to the buffer at the given offset.
    ///
    /// The caller has already validated the buffer length.
    #[inline(always)]
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B, offset: usize) {
        buffer.put_u32_le(offset, self.instrument_id);
        buffer.put_u32_le(offset + 4, 0);
        buffer.put_u64_le(offset + 8, self.sequence);
        buffer.put_i64_le(offset + 16, self.price);
        buffer.put_u64_le(offset + 24, self.source_timestamp);
    }

    /// Decodes a record from the buffer at the given offset.
    ///
    /// The caller has already validated the buffer length.
    #[inline(always)]
    #[must_use]
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B, offset: usize) -> Self {
        Self {
            instrument_id: buffer.get_u32_le(offset),
            sequence: buffer.get_u64_le(offset + 8),
            price: buffer.get_i64_le(offset + 16),
            source_timestamp: buffer.get_u64_le(offset + 24),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let record = PriceRecord {
            instrument_id: 7,
            sequence: 42,
            price: -12_345,
            source_timestamp: 1_700_000_000_000_000_000,
        };

        let mut buf = vec![0u8; PriceRecord::ENCODED_LENGTH];
        record.encode(&mut buf, 0);
        assert_eq!(PriceRecord::decode(&buf, 0), record);
    }

    #[test]
    fn test_record_round_trip_at_offset() {
        let record = PriceRecord {
            instrument_id: u32::MAX,
            sequence: u64::MAX,
            price: i64::MIN,
            source_timestamp: u64::MAX,
        };

        let mut buf = vec![0u8; 64];
        record.encode(&mut buf, 16);
        assert_eq!(PriceRecord::decode(&buf, 16), record);
    }

    #[test]
    fn test_record_padding_zeroed() {
        let mut buf = vec![0xAAu8; PriceRecord::ENCODED_LENGTH];
        PriceRecord::default().encode(&mut buf, 0);
        assert_eq!(&buf[4..8], &[0u8; 4]);
    }
}
