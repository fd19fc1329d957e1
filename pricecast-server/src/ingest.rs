//! The ingest path.
//!
//! Every price entering the engine flows through [`IngestEngine::ingest`]:
//! producer updates, redelivered frames, and batch-run merges alike. The
//! engine owns the store's unique writer, so running it on one task keeps
//! the single-writer discipline intact.

use crate::clock;
use pricecast_core::PriceUpdate;
use pricecast_core::types::PriceRecord;
use pricecast_store::{StoreWriter, Upsert};

/// Counters for the ingest path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Updates applied and republished.
    pub applied: u64,
    /// Stamped updates dropped as stale (redeliveries, reordering).
    pub stale: u64,
    /// Updates rejected because the instrument capacity is exhausted.
    pub rejected: u64,
}

/// Applies updates to the store and stamps them for redistribution.
pub struct IngestEngine {
    writer: StoreWriter,
    stats: IngestStats,
}

impl IngestEngine {
    /// Creates an engine around the store's unique writer.
    #[must_use]
    pub fn new(writer: StoreWriter) -> Self {
        Self {
            writer,
            stats: IngestStats::default(),
        }
    }

    /// Ingests one producer update.
    ///
    /// An update with sequence zero is fresh: it gets the next
    /// per-instrument sequence. A non-zero sequence marks a redelivered,
    /// already stamped record; it only lands if still strictly newer.
    ///
    /// # Returns
    /// The stamped record to republish on the feed, or `None` if the
    /// update was dropped (stale or over capacity).
    pub fn ingest(&mut self, update: &PriceUpdate) -> Option<PriceRecord> {
        self.ingest_at(update, clock::unix_nanos())
    }

    /// Same as [`ingest`](Self::ingest) with an explicit receive timestamp.
    pub fn ingest_at(&mut self, update: &PriceUpdate, receive_timestamp: u64) -> Option<PriceRecord> {
        let record = &update.record;
        if record.sequence == 0 {
            match self.writer.apply(
                record.instrument_id,
                record.price,
                record.source_timestamp,
                receive_timestamp,
            ) {
                Ok(stamped) => {
                    self.stats.applied += 1;
                    Some(stamped)
                }
                Err(e) => {
                    self.stats.rejected += 1;
                    tracing::warn!(instrument_id = record.instrument_id, error = %e, "update rejected");
                    None
                }
            }
        } else {
            match self.writer.apply_stamped(record, receive_timestamp) {
                Ok(Upsert::Applied) => {
                    self.stats.applied += 1;
                    Some(*record)
                }
                Ok(Upsert::Stale) => {
                    self.stats.stale += 1;
                    None
                }
                Err(e) => {
                    self.stats.rejected += 1;
                    tracing::warn!(instrument_id = record.instrument_id, error = %e, "update rejected");
                    None
                }
            }
        }
    }

    /// Current counter values.
    #[must_use]
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// The store writer, for paths that bypass update framing (batch merge).
    pub fn writer(&mut self) -> &mut StoreWriter {
        &mut self.writer
    }
}
