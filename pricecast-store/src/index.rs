//! Lock-free instrument index.
//!
//! Maps instrument identifiers to slot positions via a preallocated
//! open-addressing hash table. The single writer inserts; readers probe
//! concurrently without locks. Entries are never removed, so a reader that
//! finds a populated cell can trust it forever.

use crate::error::{Result, StoreError};
use pricecast_core::InstrumentId;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Sentinel marking an unused table cell. Cannot collide with a packed
/// entry because slot numbers are bounded by the instrument capacity.
const EMPTY: u64 = u64::MAX;

#[inline(always)]
fn pack(instrument_id: InstrumentId, slot: u32) -> u64 {
    (u64::from(instrument_id) << 32) | u64::from(slot)
}

#[inline(always)]
fn unpack(cell: u64) -> (InstrumentId, u32) {
    ((cell >> 32) as u32, cell as u32)
}

/// Fibonacci hashing spreads dense identifier ranges across the table.
#[inline(always)]
fn hash(instrument_id: InstrumentId) -> u64 {
    u64::from(instrument_id).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Maps instrument identifiers to fixed slot positions.
pub(crate) struct InstrumentIndex {
    /// Open-addressing table of packed `(instrument_id, slot)` cells.
    cells: Box<[AtomicU64]>,
    /// Reverse mapping: slot position to instrument identifier.
    ids: Box<[AtomicU64]>,
    /// Number of slots allocated so far. Slots `0..len` are valid.
    len: AtomicUsize,
    mask: usize,
    capacity: usize,
}

impl InstrumentIndex {
    /// Creates an index for up to `capacity` distinct instruments.
    ///
    /// The table is sized to at least twice the capacity (rounded up to a
    /// power of two) to keep probe chains short.
    pub(crate) fn new(capacity: usize) -> Self {
        let table_size = (capacity.max(1) * 2).next_power_of_two();
        let cells = (0..table_size)
            .map(|_| AtomicU64::new(EMPTY))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let ids = (0..capacity)
            .map(|_| AtomicU64::new(EMPTY))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            cells,
            ids,
            len: AtomicUsize::new(0),
            mask: table_size - 1,
            capacity,
        }
    }

    /// Looks up the slot position for an instrument. Lock-free.
    #[inline(always)]
    pub(crate) fn get(&self, instrument_id: InstrumentId) -> Option<usize> {
        let mut position = hash(instrument_id) as usize & self.mask;
        loop {
            let cell = self.cells[position].load(Ordering::Acquire);
            if cell == EMPTY {
                return None;
            }
            let (id, slot) = unpack(cell);
            if id == instrument_id {
                return Some(slot as usize);
            }
            position = (position + 1) & self.mask;
        }
    }

    /// Returns the slot for an instrument, allocating one if it is new.
    /// Must only be called from the single writer.
    ///
    /// # Errors
    /// Returns [`StoreError::CapacityExhausted`] if a new instrument would
    /// exceed the configured capacity.
    pub(crate) fn get_or_insert(&self, instrument_id: InstrumentId) -> Result<usize> {
        let mut position = hash(instrument_id) as usize & self.mask;
        loop {
            let cell = self.cells[position].load(Ordering::Acquire);
            if cell == EMPTY {
                let slot = self.len.load(Ordering::Relaxed);
                if slot >= self.capacity {
                    return Err(StoreError::CapacityExhausted {
                        capacity: self.capacity,
                    });
                }
                self.ids[slot].store(u64::from(instrument_id), Ordering::Relaxed);
                self.cells[position].store(
                    pack(instrument_id, slot as u32),
                    Ordering::Release,
                );
                self.len.store(slot + 1, Ordering::Release);
                return Ok(slot);
            }
            let (id, slot) = unpack(cell);
            if id == instrument_id {
                return Ok(slot as usize);
            }
            position = (position + 1) & self.mask;
        }
    }

    /// Returns the instrument identifier stored at a slot position.
    ///
    /// Only valid for `slot < self.len()`.
    #[inline]
    pub(crate) fn id_at(&self, slot: usize) -> InstrumentId {
        self.ids[slot].load(Ordering::Relaxed) as InstrumentId
    }

    /// Number of instruments registered so far.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}
