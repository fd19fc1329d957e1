//! Consumer-side last-value view.
//!
//! A plain map of the newest record per instrument, maintained by the
//! strictly-greater sequence rule. Stale and duplicated incrementals fall
//! out here no matter what the transport did to them.

use pricecast_core::{InstrumentId, PriceRecord};
use std::collections::HashMap;

/// The newest value known for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEntry {
    /// Per-instrument sequence the entry was stamped with.
    pub sequence: u64,
    /// Price in fixed-point integer units.
    pub price: i64,
    /// Producer timestamp.
    pub source_timestamp: u64,
}

/// Outcome of applying one incremental to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewApply {
    /// The record was newer and now backs the entry.
    Applied {
        /// Updates skipped between the previous and this sequence. A
        /// non-zero value means the feed lost or reordered something.
        missed: u64,
    },
    /// The record was not strictly newer; the view is unchanged.
    Stale,
}

/// Last-value map for one consumer.
#[derive(Debug, Default)]
pub struct LastValueView {
    entries: HashMap<InstrumentId, ViewEntry>,
}

impl LastValueView {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the view contents with a snapshot.
    pub fn load_snapshot(&mut self, records: &[PriceRecord]) {
        self.entries.clear();
        for record in records {
            self.entries.insert(
                record.instrument_id,
                ViewEntry {
                    sequence: record.sequence,
                    price: record.price,
                    source_timestamp: record.source_timestamp,
                },
            );
        }
    }

    /// Applies one incremental under the strictly-greater rule.
    pub fn apply(&mut self, record: &PriceRecord) -> ViewApply {
        let previous = self
            .entries
            .get(&record.instrument_id)
            .map(|entry| entry.sequence);
        match previous {
            Some(current) if record.sequence <= current => ViewApply::Stale,
            _ => {
                // A first sighting has no baseline to measure a gap against.
                let missed = previous
                    .map(|current| record.sequence - current - 1)
                    .unwrap_or(0);
                self.entries.insert(
                    record.instrument_id,
                    ViewEntry {
                        sequence: record.sequence,
                        price: record.price,
                        source_timestamp: record.source_timestamp,
                    },
                );
                ViewApply::Applied { missed }
            }
        }
    }

    /// Looks up the newest value for an instrument.
    #[must_use]
    pub fn get(&self, instrument_id: InstrumentId) -> Option<&ViewEntry> {
        self.entries.get(&instrument_id)
    }

    /// Number of instruments in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the view holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&InstrumentId, &ViewEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(instrument_id: u32, sequence: u64, price: i64) -> PriceRecord {
        PriceRecord {
            instrument_id,
            sequence,
            price,
            source_timestamp: 0,
        }
    }

    #[test]
    fn test_apply_in_order() {
        let mut view = LastValueView::new();

        assert_eq!(view.apply(&record(1, 1, 100)), ViewApply::Applied { missed: 0 });
        assert_eq!(view.apply(&record(1, 2, 101)), ViewApply::Applied { missed: 0 });
        assert_eq!(view.get(1).unwrap().price, 101);
    }

    #[test]
    fn test_duplicate_and_stale_rejected() {
        let mut view = LastValueView::new();
        view.apply(&record(1, 5, 100));

        assert_eq!(view.apply(&record(1, 5, 999)), ViewApply::Stale);
        assert_eq!(view.apply(&record(1, 3, 999)), ViewApply::Stale);
        assert_eq!(view.get(1).unwrap().price, 100);
    }

    #[test]
    fn test_gap_reported_but_applied() {
        let mut view = LastValueView::new();
        view.apply(&record(1, 1, 100));

        assert_eq!(view.apply(&record(1, 5, 200)), ViewApply::Applied { missed: 3 });
        assert_eq!(view.get(1).unwrap().sequence, 5);
    }

    #[test]
    fn test_first_sighting_is_not_a_gap() {
        let mut view = LastValueView::new();
        assert_eq!(view.apply(&record(9, 7, 100)), ViewApply::Applied { missed: 0 });
    }

    #[test]
    fn test_snapshot_replaces_contents() {
        let mut view = LastValueView::new();
        view.apply(&record(1, 9, 100));

        view.load_snapshot(&[record(2, 3, 200), record(3, 1, 300)]);
        assert!(view.get(1).is_none());
        assert_eq!(view.len(), 2);
        assert_eq!(view.get(2).unwrap().sequence, 3);
    }

    #[test]
    fn test_incremental_older_than_snapshot_dropped() {
        let mut view = LastValueView::new();
        view.load_snapshot(&[record(1, 10, 100)]);

        assert_eq!(view.apply(&record(1, 10, 999)), ViewApply::Stale);
        assert_eq!(view.apply(&record(1, 11, 101)), ViewApply::Applied { missed: 0 });
    }
}
