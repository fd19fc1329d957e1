//! Last-value entry and snapshot types.

use pricecast_core::{InstrumentId, PriceRecord};

/// The last observed value for a single instrument.
///
/// Entries are plain copies: once read out of the store they never change,
/// regardless of what the writer does afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LastValueEntry {
    /// Per-instrument sequence number (starts at 1, strictly increasing)
    pub sequence: u64,
    /// Price in fixed-point integer units
    pub price: i64,
    /// Timestamp assigned by the producer (nanoseconds)
    pub source_timestamp: u64,
    /// Timestamp assigned at ingest (nanoseconds)
    pub receive_timestamp: u64,
}

impl LastValueEntry {
    /// Converts the entry into a wire record for the given instrument.
    #[must_use]
    pub fn to_record(&self, instrument_id: InstrumentId) -> PriceRecord {
        PriceRecord {
            instrument_id,
            sequence: self.sequence,
            price: self.price,
            source_timestamp: self.source_timestamp,
        }
    }
}

/// A point-in-time copy of every published instrument.
///
/// Entries appear in insertion order (the order instruments were first seen
/// by the writer), each internally consistent under concurrent writes. The
/// snapshot as a whole is not an atomic cut across instruments.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Vec<(InstrumentId, LastValueEntry)>,
}

impl Snapshot {
    pub(crate) fn new(entries: Vec<(InstrumentId, LastValueEntry)>) -> Self {
        Self { entries }
    }

    /// Returns the number of instruments captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no instrument has been published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a single instrument in the snapshot.
    #[must_use]
    pub fn get(&self, instrument_id: InstrumentId) -> Option<&LastValueEntry> {
        self.entries
            .iter()
            .find(|(id, _)| *id == instrument_id)
            .map(|(_, entry)| entry)
    }

    /// Iterates over the captured entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(InstrumentId, LastValueEntry)> {
        self.entries.iter()
    }

    /// Converts the snapshot into wire records in insertion order.
    #[must_use]
    pub fn to_records(&self) -> Vec<PriceRecord> {
        self.entries
            .iter()
            .map(|(id, entry)| entry.to_record(*id))
            .collect()
    }
}

impl IntoIterator for Snapshot {
    type Item = (InstrumentId, LastValueEntry);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
