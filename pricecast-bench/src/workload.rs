//! Synthetic update workloads shared by the benchmarks.

use pricecast_core::PriceRecord;

/// Generates a deterministic stream of fresh updates over a fixed
/// instrument universe. The walk touches every instrument evenly.
pub struct UpdateStream {
    universe: u32,
    cursor: u64,
}

impl UpdateStream {
    /// Creates a stream over `universe` instruments.
    #[must_use]
    pub fn new(universe: u32) -> Self {
        Self { universe, cursor: 0 }
    }

    /// Produces the next update in the stream.
    pub fn next_record(&mut self) -> PriceRecord {
        self.cursor += 1;
        let instrument_id = (self.cursor % u64::from(self.universe)) as u32;
        PriceRecord {
            instrument_id,
            sequence: 0,
            // Cheap pseudo-random walk that stays deterministic.
            price: ((self.cursor.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 20) & 0xFFFF) as i64,
            source_timestamp: self.cursor,
        }
    }

    /// Collects `count` updates into a vector.
    #[must_use]
    pub fn take(&mut self, count: usize) -> Vec<PriceRecord> {
        (0..count).map(|_| self.next_record()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_is_deterministic() {
        let a: Vec<_> = UpdateStream::new(16).take(100);
        let b: Vec<_> = UpdateStream::new(16).take(100);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stream_covers_universe() {
        let records = UpdateStream::new(8).take(64);
        for id in 0..8u32 {
            assert!(records.iter().any(|r| r.instrument_id == id));
        }
    }
}
