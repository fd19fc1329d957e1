//! Seqlock-style slot cell holding one instrument's last value.
//!
//! Each slot is written by exactly one writer and read by any number of
//! readers without locks. The version counter is odd while a write is in
//! flight; readers retry when they observe an odd or changed version, so a
//! completed read is always an internally consistent entry.
//!
//! All fields are atomics accessed with `Relaxed` ordering between the
//! version fences, which keeps the protocol free of data races while the
//! fences provide the required publication ordering.

use crate::entry::LastValueEntry;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering, fence};

/// A single-writer, multi-reader cell for one instrument.
#[derive(Debug, Default)]
pub(crate) struct SlotCell {
    /// Even when stable, odd while a write is in progress. Zero means the
    /// slot has never been published.
    version: AtomicU64,
    sequence: AtomicU64,
    price: AtomicI64,
    source_timestamp: AtomicU64,
    receive_timestamp: AtomicU64,
}

impl SlotCell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Publishes a new entry. Must only be called from the single writer.
    #[inline(always)]
    pub(crate) fn publish(&self, entry: &LastValueEntry) {
        let version = self.version.load(Ordering::Relaxed);
        self.version.store(version.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.sequence.store(entry.sequence, Ordering::Relaxed);
        self.price.store(entry.price, Ordering::Relaxed);
        self.source_timestamp
            .store(entry.source_timestamp, Ordering::Relaxed);
        self.receive_timestamp
            .store(entry.receive_timestamp, Ordering::Relaxed);

        self.version.store(version.wrapping_add(2), Ordering::Release);
    }

    /// Reads the current entry, retrying across concurrent writes.
    ///
    /// # Returns
    /// `None` if the slot has never been published.
    #[inline(always)]
    pub(crate) fn read(&self) -> Option<LastValueEntry> {
        loop {
            let v1 = self.version.load(Ordering::Acquire);
            if v1 == 0 {
                return None;
            }
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }

            let entry = LastValueEntry {
                sequence: self.sequence.load(Ordering::Relaxed),
                price: self.price.load(Ordering::Relaxed),
                source_timestamp: self.source_timestamp.load(Ordering::Relaxed),
                receive_timestamp: self.receive_timestamp.load(Ordering::Relaxed),
            };

            fence(Ordering::Acquire);
            if self.version.load(Ordering::Relaxed) == v1 {
                return Some(entry);
            }
            std::hint::spin_loop();
        }
    }
}
