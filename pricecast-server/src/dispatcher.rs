//! Request dispatcher.
//!
//! Routes every inbound frame by its header message type: updates into the
//! ingest path, snapshot requests to the snapshot service, batch requests
//! to the batch repository. A malformed or unknown frame is logged and
//! counted, never fatal.

use crate::batch::BatchRunRepository;
use crate::error::ServerError;
use crate::ingest::IngestEngine;
use crate::snapshot::SnapshotService;
use pricecast_core::messages::{
    CancelBatchResponse, CompleteBatchResponse, StartBatchResponse, UploadChunkResponse,
};
use pricecast_core::{CodecError, Message, PriceRecord, PriceUpdate, Status};
use std::time::Instant;

/// Counters for the dispatch path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames that decoded and were routed.
    pub dispatched: u64,
    /// Frames with a message type outside the protocol.
    pub unknown: u64,
    /// Frames that failed wire-format validation.
    pub malformed: u64,
    /// Frames dropped for exceeding the configured frame size limit.
    pub oversized: u64,
    /// Valid frames that are not requests (e.g. a stray response).
    pub unexpected: u64,
}

/// Result of dispatching one frame.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Encoded response frame, if the request calls for one.
    pub response: Option<Vec<u8>>,
    /// Stamped records to publish on the incremental feed.
    pub published: Vec<PriceRecord>,
}

/// Routes inbound frames to the engine's services.
pub struct RequestDispatcher {
    snapshots: SnapshotService,
    batches: BatchRunRepository,
    max_frame_size: usize,
    stats: DispatchStats,
}

impl RequestDispatcher {
    /// Creates a dispatcher over the engine's services.
    #[must_use]
    pub fn new(
        snapshots: SnapshotService,
        batches: BatchRunRepository,
        max_frame_size: usize,
    ) -> Self {
        Self {
            snapshots,
            batches,
            max_frame_size,
            stats: DispatchStats::default(),
        }
    }

    /// Dispatches one inbound frame.
    ///
    /// Frames above the configured size limit are dropped before decoding,
    /// whatever transport they arrived on.
    ///
    /// # Errors
    /// Returns [`ServerError`] only on response encoding failure; inbound
    /// decode problems are counted and swallowed.
    pub fn dispatch(
        &mut self,
        ingest: &mut IngestEngine,
        frame: &[u8],
        now: Instant,
    ) -> Result<DispatchOutcome, ServerError> {
        if frame.len() > self.max_frame_size {
            self.stats.oversized += 1;
            tracing::warn!(
                size = frame.len(),
                max = self.max_frame_size,
                "dropping oversized frame"
            );
            return Ok(DispatchOutcome::default());
        }
        let message = match Message::decode(frame) {
            Ok(message) => message,
            Err(CodecError::UnknownMessageType { message_type }) => {
                self.stats.unknown += 1;
                tracing::warn!(message_type, "dropping frame with unknown message type");
                return Ok(DispatchOutcome::default());
            }
            Err(e) => {
                self.stats.malformed += 1;
                tracing::warn!(error = %e, "dropping malformed frame");
                return Ok(DispatchOutcome::default());
            }
        };
        self.stats.dispatched += 1;

        let mut outcome = DispatchOutcome::default();
        match message {
            Message::PriceUpdate(update) => {
                if let Some(stamped) = ingest.ingest(&update) {
                    outcome.published.push(stamped);
                }
            }
            Message::SnapshotRequest(request) => {
                let response = self.snapshots.serve(&request);
                let mut buf = vec![0u8; response.frame_length()];
                response.encode(&mut buf)?;
                outcome.response = Some(buf);
            }
            Message::StartBatch(_) => {
                let response = match self.batches.start(now) {
                    Ok(batch_id) => StartBatchResponse {
                        status: Status::Ok,
                        batch_id,
                    },
                    Err(status) => StartBatchResponse {
                        status,
                        batch_id: 0,
                    },
                };
                let mut buf = vec![0u8; StartBatchResponse::FRAME_LENGTH];
                response.encode(&mut buf)?;
                outcome.response = Some(buf);
            }
            Message::UploadChunk(request) => {
                let status = self.batches.upload(request.batch_id, &request.records, now);
                let mut buf = vec![0u8; UploadChunkResponse::FRAME_LENGTH];
                UploadChunkResponse { status }.encode(&mut buf)?;
                outcome.response = Some(buf);
            }
            Message::CompleteBatch(request) => {
                let status = match self.batches.complete(request.batch_id, now) {
                    Some(staged) => {
                        self.merge_staged(ingest, staged, &mut outcome.published);
                        Status::Ok
                    }
                    None => Status::BatchNotFound,
                };
                let mut buf = vec![0u8; CompleteBatchResponse::FRAME_LENGTH];
                CompleteBatchResponse { status }.encode(&mut buf)?;
                outcome.response = Some(buf);
            }
            Message::CancelBatch(request) => {
                // Cancelling an already evicted run is still a success:
                // either way the staged data is gone.
                self.batches.cancel(request.batch_id);
                let mut buf = vec![0u8; CancelBatchResponse::FRAME_LENGTH];
                CancelBatchResponse { status: Status::Ok }.encode(&mut buf)?;
                outcome.response = Some(buf);
            }
            other => {
                self.stats.unexpected += 1;
                tracing::warn!(
                    message_type = other.message_type(),
                    "dropping non-request frame"
                );
            }
        }
        Ok(outcome)
    }

    /// Merges a completed batch through the ingest path, one instrument at
    /// a time. Every merged price gets a fresh sequence and is republished
    /// like any live update.
    fn merge_staged(
        &mut self,
        ingest: &mut IngestEngine,
        staged: Vec<(u32, crate::batch::StagedPrice)>,
        published: &mut Vec<PriceRecord>,
    ) {
        for (instrument_id, price) in staged {
            let update = PriceUpdate {
                record: PriceRecord {
                    instrument_id,
                    sequence: 0,
                    price: price.price,
                    source_timestamp: price.source_timestamp,
                },
            };
            if let Some(stamped) = ingest.ingest(&update) {
                published.push(stamped);
            }
        }
    }

    /// Current counter values.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Number of currently open batch runs.
    #[must_use]
    pub fn open_batches(&self) -> usize {
        self.batches.open_count()
    }
}
