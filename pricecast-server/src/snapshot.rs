//! Snapshot service for joining consumers.

use pricecast_core::{SnapshotRequest, SnapshotResponse};
use pricecast_store::PriceStore;
use std::sync::Arc;

/// Serves point-in-time snapshots of the store.
///
/// Reads lock-free store state only; any task may hold one without
/// touching the writer.
pub struct SnapshotService {
    store: Arc<PriceStore>,
}

impl SnapshotService {
    /// Creates a service over a shared store handle.
    #[must_use]
    pub fn new(store: Arc<PriceStore>) -> Self {
        Self { store }
    }

    /// Builds the response for one snapshot request.
    ///
    /// The response echoes the request id and carries every published
    /// instrument with the sequence its entry was stamped with, which is
    /// what lets the consumer discard incrementals already covered.
    #[must_use]
    pub fn serve(&self, request: &SnapshotRequest) -> SnapshotResponse {
        let snapshot = self.store.snapshot();
        tracing::debug!(
            request_id = request.request_id,
            entries = snapshot.len(),
            "serving snapshot"
        );
        SnapshotResponse {
            request_id: request.request_id,
            entries: snapshot.to_records(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricecast_store::PriceStore;

    #[test]
    fn test_empty_snapshot() {
        let (_writer, store) = PriceStore::with_capacity(4);
        let service = SnapshotService::new(store);

        let response = service.serve(&SnapshotRequest { request_id: 9 });
        assert_eq!(response.request_id, 9);
        assert!(response.entries.is_empty());
    }

    #[test]
    fn test_snapshot_carries_sequences() {
        let (mut writer, store) = PriceStore::with_capacity(4);
        writer.apply(1, 100, 0, 0).unwrap();
        writer.apply(1, 101, 0, 0).unwrap();
        writer.apply(2, 200, 0, 0).unwrap();

        let service = SnapshotService::new(store);
        let response = service.serve(&SnapshotRequest { request_id: 1 });

        assert_eq!(response.entries.len(), 2);
        let first = response.entries.iter().find(|r| r.instrument_id == 1).unwrap();
        assert_eq!(first.sequence, 2);
        assert_eq!(first.price, 101);
    }
}
