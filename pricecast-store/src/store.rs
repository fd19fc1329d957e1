//! The last-value price store.
//!
//! A fixed-capacity, preallocated store with exactly one writer and any
//! number of concurrent readers. Construction returns the writer handle and
//! a shared read handle; the writer cannot be cloned, so the single-writer
//! discipline holds by construction.

use crate::entry::{LastValueEntry, Snapshot};
use crate::error::Result;
use crate::index::InstrumentIndex;
use crate::sequencer::Sequencer;
use crate::slot::SlotCell;
use crossbeam_utils::CachePadded;
use pricecast_core::{InstrumentId, PriceRecord};
use std::sync::Arc;

/// Outcome of applying a pre-stamped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The record was newer than the stored entry and was published.
    Applied,
    /// The record's sequence was not strictly greater; nothing changed.
    Stale,
}

/// Shared read side of the store. Cheap to clone via `Arc`.
pub struct PriceStore {
    index: InstrumentIndex,
    slots: Box<[CachePadded<SlotCell>]>,
}

impl PriceStore {
    /// Creates a store for up to `capacity` distinct instruments.
    ///
    /// # Returns
    /// The unique writer handle and the shared read handle.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (StoreWriter, Arc<PriceStore>) {
        let slots = (0..capacity)
            .map(|_| CachePadded::new(SlotCell::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let store = Arc::new(PriceStore {
            index: InstrumentIndex::new(capacity),
            slots,
        });
        let writer = StoreWriter {
            store: Arc::clone(&store),
            sequencer: Sequencer::new(capacity),
        };
        (writer, store)
    }

    /// Reads the last value for an instrument. Lock-free and wait-free in
    /// the absence of a concurrent write to the same slot.
    ///
    /// # Returns
    /// `None` if the instrument has never been published.
    #[inline]
    #[must_use]
    pub fn get(&self, instrument_id: InstrumentId) -> Option<LastValueEntry> {
        let slot = self.index.get(instrument_id)?;
        self.slots[slot].read()
    }

    /// Captures a point-in-time copy of every published instrument.
    ///
    /// Each entry is internally consistent; the snapshot is not an atomic
    /// cut across instruments. Writes proceed untouched while the snapshot
    /// is taken.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let len = self.index.len();
        let mut entries = Vec::with_capacity(len);
        for slot in 0..len {
            if let Some(entry) = self.slots[slot].read() {
                entries.push((self.index.id_at(slot), entry));
            }
        }
        Snapshot::new(entries)
    }

    /// Number of instruments seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no instrument has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured instrument capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }
}

/// The unique write handle. Not cloneable; owning it is the permission to
/// write.
pub struct StoreWriter {
    store: Arc<PriceStore>,
    sequencer: Sequencer,
}

impl StoreWriter {
    /// Returns a shared read handle to the underlying store.
    #[must_use]
    pub fn store(&self) -> Arc<PriceStore> {
        Arc::clone(&self.store)
    }

    /// Applies an unstamped update: assigns the next per-instrument
    /// sequence and publishes.
    ///
    /// # Returns
    /// The fully stamped record, ready for redistribution.
    ///
    /// # Errors
    /// Returns [`StoreError::CapacityExhausted`] for a new instrument
    /// beyond the configured capacity; the store is untouched.
    ///
    /// [`StoreError::CapacityExhausted`]: crate::StoreError::CapacityExhausted
    pub fn apply(
        &mut self,
        instrument_id: InstrumentId,
        price: i64,
        source_timestamp: u64,
        receive_timestamp: u64,
    ) -> Result<PriceRecord> {
        let slot = self.store.index.get_or_insert(instrument_id)?;
        let sequence = self.sequencer.next(slot);
        let entry = LastValueEntry {
            sequence,
            price,
            source_timestamp,
            receive_timestamp,
        };
        self.store.slots[slot].publish(&entry);
        Ok(entry.to_record(instrument_id))
    }

    /// Applies a record that already carries a sequence, enforcing the
    /// strictly-greater rule. Redelivered records come back [`Upsert::Stale`]
    /// and leave the store untouched.
    ///
    /// # Errors
    /// Returns [`StoreError::CapacityExhausted`] for a new instrument
    /// beyond the configured capacity.
    ///
    /// [`StoreError::CapacityExhausted`]: crate::StoreError::CapacityExhausted
    pub fn apply_stamped(
        &mut self,
        record: &PriceRecord,
        receive_timestamp: u64,
    ) -> Result<Upsert> {
        let slot = self.store.index.get_or_insert(record.instrument_id)?;
        if !self.sequencer.observe(slot, record.sequence) {
            return Ok(Upsert::Stale);
        }
        let entry = LastValueEntry {
            sequence: record.sequence,
            price: record.price,
            source_timestamp: record.source_timestamp,
            receive_timestamp,
        };
        self.store.slots[slot].publish(&entry);
        Ok(Upsert::Applied)
    }

    /// Last sequence assigned for an instrument, zero if never seen.
    #[must_use]
    pub fn last_sequence(&self, instrument_id: InstrumentId) -> u64 {
        match self.store.index.get(instrument_id) {
            Some(slot) => self.sequencer.current(slot),
            None => 0,
        }
    }
}
