//! Join-protocol state machine.
//!
//! A consumer joins mid-stream: it starts buffering incrementals, requests
//! a snapshot, loads it, then drains the buffer against the snapshot's
//! sequences. The strictly-greater rule makes the join seamless: anything
//! the snapshot already covers falls out as stale, anything newer applies.
//!
//! The machine is pure state; the consumer drives it with decoded frames
//! and forwards the returned events.

use crate::view::{LastValueView, ViewApply, ViewEntry};
use parking_lot::RwLock;
use pricecast_core::{InstrumentId, PriceRecord, SnapshotResponse};
use std::collections::VecDeque;
use std::sync::Arc;

/// Consumer lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Buffering incrementals while waiting for a snapshot.
    Joining,
    /// Snapshot loaded; draining the buffered incrementals.
    Reconciling,
    /// Serving reads and applying incrementals directly.
    Live,
}

/// Events the session emits while processing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved to a new state.
    StateChanged(SessionState),
    /// An incremental was applied to the view.
    Updated(PriceRecord),
    /// A sequence jump was observed on an instrument. The update itself
    /// was still applied; this only records the loss.
    GapDetected {
        /// Instrument the jump was observed on.
        instrument_id: InstrumentId,
        /// Number of updates skipped.
        missed: u64,
        /// Sequence that revealed the jump.
        sequence: u64,
    },
}

/// Cloneable read handle over a session's view.
#[derive(Clone)]
pub struct SharedView {
    inner: Arc<RwLock<LastValueView>>,
}

impl SharedView {
    /// Looks up the newest value for an instrument.
    #[must_use]
    pub fn get(&self, instrument_id: InstrumentId) -> Option<ViewEntry> {
        self.inner.read().get(instrument_id).copied()
    }

    /// Number of instruments in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if the view holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copies the current view contents.
    #[must_use]
    pub fn entries(&self) -> Vec<(InstrumentId, ViewEntry)> {
        self.inner
            .read()
            .iter()
            .map(|(id, entry)| (*id, *entry))
            .collect()
    }
}

/// The join-protocol state machine.
pub struct JoinSession {
    state: SessionState,
    view: Arc<RwLock<LastValueView>>,
    buffer: VecDeque<PriceRecord>,
    buffer_capacity: usize,
    pending_request: Option<u64>,
    dropped_while_buffering: u64,
}

impl JoinSession {
    /// Creates a session with the given join-buffer capacity.
    #[must_use]
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            state: SessionState::Joining,
            view: Arc::new(RwLock::new(LastValueView::new())),
            buffer: VecDeque::with_capacity(buffer_capacity),
            buffer_capacity,
            pending_request: None,
            dropped_while_buffering: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read handle over the view, cheap to clone and share.
    #[must_use]
    pub fn view(&self) -> SharedView {
        SharedView {
            inner: Arc::clone(&self.view),
        }
    }

    /// Incrementals dropped because the join buffer overflowed. A dropped
    /// buffered update surfaces later as a gap, never as a wrong value.
    #[must_use]
    pub fn dropped_while_buffering(&self) -> u64 {
        self.dropped_while_buffering
    }

    /// Starts (or restarts) a join with a fresh request id.
    pub fn begin_join(&mut self, request_id: u64) -> Vec<SessionEvent> {
        self.pending_request = Some(request_id);
        self.buffer.clear();
        if self.state == SessionState::Joining {
            Vec::new()
        } else {
            self.state = SessionState::Joining;
            vec![SessionEvent::StateChanged(SessionState::Joining)]
        }
    }

    /// Feeds one incremental into the machine.
    pub fn on_update(&mut self, record: PriceRecord) -> Vec<SessionEvent> {
        match self.state {
            SessionState::Joining | SessionState::Reconciling => {
                if self.buffer.len() == self.buffer_capacity {
                    self.buffer.pop_front();
                    self.dropped_while_buffering += 1;
                }
                self.buffer.push_back(record);
                Vec::new()
            }
            SessionState::Live => {
                let mut events = Vec::new();
                self.apply(record, &mut events);
                events
            }
        }
    }

    /// Feeds a snapshot response into the machine.
    ///
    /// A response whose request id does not match the outstanding request
    /// is a late reply to an earlier retry and is ignored.
    pub fn on_snapshot(&mut self, response: &SnapshotResponse) -> Vec<SessionEvent> {
        if self.pending_request != Some(response.request_id) {
            tracing::debug!(
                request_id = response.request_id,
                "ignoring snapshot for a superseded request"
            );
            return Vec::new();
        }
        self.pending_request = None;

        let mut events = Vec::new();
        self.view.write().load_snapshot(&response.entries);
        self.state = SessionState::Reconciling;
        events.push(SessionEvent::StateChanged(SessionState::Reconciling));

        // Drain the join buffer against the snapshot's sequences. Updates
        // the snapshot already covers fall out as stale here.
        let buffered: Vec<_> = self.buffer.drain(..).collect();
        for record in buffered {
            self.apply(record, &mut events);
        }

        self.state = SessionState::Live;
        events.push(SessionEvent::StateChanged(SessionState::Live));
        events
    }

    fn apply(&mut self, record: PriceRecord, events: &mut Vec<SessionEvent>) {
        match self.view.write().apply(&record) {
            ViewApply::Applied { missed } => {
                if missed > 0 {
                    events.push(SessionEvent::GapDetected {
                        instrument_id: record.instrument_id,
                        missed,
                        sequence: record.sequence,
                    });
                }
                events.push(SessionEvent::Updated(record));
            }
            ViewApply::Stale => {}
        }
    }
}
