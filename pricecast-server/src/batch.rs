//! Batch runs.
//!
//! A batch run stages a bulk price load away from the live store: chunks
//! are uploaded into the run, and nothing is visible until the run
//! completes, at which point the staged prices merge through the normal
//! ingest path. A run left idle past the eviction timeout is discarded.

use pricecast_core::{InstrumentId, PriceRecord, Status};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A price staged inside an open batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedPrice {
    /// Price in fixed-point integer units.
    pub price: i64,
    /// Producer timestamp; newest wins inside the run.
    pub source_timestamp: u64,
}

/// One open batch run.
struct BatchRun {
    staged: HashMap<InstrumentId, StagedPrice>,
    last_activity: Instant,
    chunks_uploaded: u64,
}

impl BatchRun {
    fn new(now: Instant) -> Self {
        Self {
            staged: HashMap::new(),
            last_activity: now,
            chunks_uploaded: 0,
        }
    }

    /// Stages one record. Within a run the newest source timestamp wins,
    /// regardless of upload order.
    fn stage(&mut self, record: &PriceRecord) {
        let candidate = StagedPrice {
            price: record.price,
            source_timestamp: record.source_timestamp,
        };
        self.staged
            .entry(record.instrument_id)
            .and_modify(|existing| {
                if candidate.source_timestamp >= existing.source_timestamp {
                    *existing = candidate;
                }
            })
            .or_insert(candidate);
    }
}

/// Holds all open batch runs and enforces their limits.
pub struct BatchRunRepository {
    active: HashMap<u64, BatchRun>,
    next_id: u64,
    max_active: usize,
    max_chunk_size: usize,
    eviction_timeout: Duration,
}

impl BatchRunRepository {
    /// Creates a repository with the given limits.
    #[must_use]
    pub fn new(max_active: usize, max_chunk_size: usize, eviction_timeout: Duration) -> Self {
        Self {
            active: HashMap::new(),
            next_id: 1,
            max_active,
            max_chunk_size,
            eviction_timeout,
        }
    }

    /// Opens a new batch run.
    ///
    /// # Returns
    /// The new batch id, or [`Status::CapacityExhausted`] if too many runs
    /// are already open after evicting stale ones.
    pub fn start(&mut self, now: Instant) -> Result<u64, Status> {
        self.evict_stale(now);
        if self.active.len() >= self.max_active {
            return Err(Status::CapacityExhausted);
        }
        let batch_id = self.next_id;
        self.next_id += 1;
        self.active.insert(batch_id, BatchRun::new(now));
        tracing::debug!(batch_id, "batch run started");
        Ok(batch_id)
    }

    /// Uploads one chunk into an open run.
    pub fn upload(&mut self, batch_id: u64, records: &[PriceRecord], now: Instant) -> Status {
        self.evict_stale(now);
        if records.len() > self.max_chunk_size {
            tracing::warn!(
                batch_id,
                chunk = records.len(),
                max = self.max_chunk_size,
                "oversized batch chunk rejected"
            );
            return Status::CapacityExhausted;
        }
        let Some(run) = self.active.get_mut(&batch_id) else {
            return Status::BatchNotFound;
        };
        for record in records {
            run.stage(record);
        }
        run.last_activity = now;
        run.chunks_uploaded += 1;
        Status::Ok
    }

    /// Completes a run, draining its staged prices for the merge.
    ///
    /// # Returns
    /// The staged prices, or `None` if the run does not exist.
    pub fn complete(&mut self, batch_id: u64, now: Instant) -> Option<Vec<(InstrumentId, StagedPrice)>> {
        self.evict_stale(now);
        let run = self.active.remove(&batch_id)?;
        tracing::debug!(
            batch_id,
            instruments = run.staged.len(),
            chunks = run.chunks_uploaded,
            "batch run completed"
        );
        Some(run.staged.into_iter().collect())
    }

    /// Cancels a run, discarding everything staged in it.
    ///
    /// # Returns
    /// `true` if the run existed.
    pub fn cancel(&mut self, batch_id: u64) -> bool {
        let existed = self.active.remove(&batch_id).is_some();
        if existed {
            tracing::debug!(batch_id, "batch run cancelled");
        }
        existed
    }

    /// Drops runs idle past the eviction timeout. Called on every request
    /// cycle rather than from a timer, so an idle repository costs nothing.
    pub fn evict_stale(&mut self, now: Instant) -> usize {
        let timeout = self.eviction_timeout;
        let before = self.active.len();
        self.active.retain(|batch_id, run| {
            let keep = now.duration_since(run.last_activity) < timeout;
            if !keep {
                tracing::warn!(batch_id, "evicting idle batch run");
            }
            keep
        });
        before - self.active.len()
    }

    /// Number of currently open runs.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(instrument_id: u32, price: i64, source_timestamp: u64) -> PriceRecord {
        PriceRecord {
            instrument_id,
            sequence: 0,
            price,
            source_timestamp,
        }
    }

    fn repo() -> BatchRunRepository {
        BatchRunRepository::new(2, 4, Duration::from_millis(5_000))
    }

    #[test]
    fn test_start_upload_complete() {
        let mut repo = repo();
        let now = Instant::now();

        let id = repo.start(now).unwrap();
        assert_eq!(repo.upload(id, &[record(1, 10, 100)], now), Status::Ok);
        assert_eq!(repo.upload(id, &[record(2, 20, 100)], now), Status::Ok);

        let staged = repo.complete(id, now).unwrap();
        assert_eq!(staged.len(), 2);
        assert_eq!(repo.open_count(), 0);
    }

    #[test]
    fn test_newest_source_timestamp_wins_in_run() {
        let mut repo = repo();
        let now = Instant::now();
        let id = repo.start(now).unwrap();

        repo.upload(id, &[record(1, 10, 200)], now);
        // Older record arrives later; it must not clobber the newer one.
        repo.upload(id, &[record(1, 99, 100)], now);

        let staged = repo.complete(id, now).unwrap();
        assert_eq!(staged[0].1.price, 10);
        assert_eq!(staged[0].1.source_timestamp, 200);
    }

    #[test]
    fn test_unknown_batch() {
        let mut repo = repo();
        let now = Instant::now();

        assert_eq!(repo.upload(404, &[record(1, 10, 0)], now), Status::BatchNotFound);
        assert!(repo.complete(404, now).is_none());
        assert!(!repo.cancel(404));
    }

    #[test]
    fn test_cancel_discards_staged() {
        let mut repo = repo();
        let now = Instant::now();
        let id = repo.start(now).unwrap();

        repo.upload(id, &[record(1, 10, 0)], now);
        assert!(repo.cancel(id));
        assert!(repo.complete(id, now).is_none());
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut repo = repo();
        let now = Instant::now();
        let id = repo.start(now).unwrap();

        let chunk: Vec<_> = (0..5).map(|i| record(i, 1, 0)).collect();
        assert_eq!(repo.upload(id, &chunk, now), Status::CapacityExhausted);

        // The run itself survives the rejected chunk.
        assert_eq!(repo.upload(id, &chunk[..4], now), Status::Ok);
    }

    #[test]
    fn test_max_active_runs() {
        let mut repo = repo();
        let now = Instant::now();

        repo.start(now).unwrap();
        repo.start(now).unwrap();
        assert_eq!(repo.start(now), Err(Status::CapacityExhausted));
    }

    #[test]
    fn test_idle_run_evicted() {
        let mut repo = repo();
        let start = Instant::now();
        let id = repo.start(start).unwrap();

        let later = start + Duration::from_millis(6_000);
        assert_eq!(repo.upload(id, &[record(1, 10, 0)], later), Status::BatchNotFound);
        assert_eq!(repo.open_count(), 0);
    }

    #[test]
    fn test_activity_defers_eviction() {
        let mut repo = repo();
        let start = Instant::now();
        let id = repo.start(start).unwrap();

        let mid = start + Duration::from_millis(3_000);
        assert_eq!(repo.upload(id, &[record(1, 10, 0)], mid), Status::Ok);

        // 6s after start but only 3s after the last upload.
        let later = start + Duration::from_millis(6_000);
        assert_eq!(repo.upload(id, &[record(2, 20, 0)], later), Status::Ok);
    }

    #[test]
    fn test_eviction_frees_capacity_for_start() {
        let mut repo = repo();
        let start = Instant::now();
        repo.start(start).unwrap();
        repo.start(start).unwrap();

        let later = start + Duration::from_millis(6_000);
        assert!(repo.start(later).is_ok());
    }
}
