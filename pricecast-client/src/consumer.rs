//! The consumer: join orchestration and the live pump.
//!
//! Owns one feed subscription and one request connection, drives the
//! [`JoinSession`] with decoded frames, and pushes session events onto a
//! lock-free stream the application polls.

use crate::error::ClientError;
use crate::session::{JoinSession, SessionEvent, SessionState, SharedView};
use pricecast_channel::spsc::{self, SpscReceiver, SpscSender};
use pricecast_core::{Message, PriceUpdate, SnapshotRequest};
use pricecast_transport::{FeedSubscriber, RequestConnection, TransportError};
use std::time::Duration;

/// Configuration for a consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// How long to wait for a snapshot response before retrying.
    pub snapshot_timeout: Duration,
    /// Snapshot attempts before the join fails.
    pub max_snapshot_attempts: u32,
    /// Incrementals buffered while a snapshot is in flight.
    pub join_buffer_capacity: usize,
    /// Depth of the event stream handed to the application.
    pub event_capacity: usize,
    /// Re-run the join protocol when a live gap is detected.
    pub resnapshot_on_gap: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            snapshot_timeout: Duration::from_secs(2),
            max_snapshot_attempts: 3,
            join_buffer_capacity: 4_096,
            event_capacity: 8_192,
            resnapshot_on_gap: false,
        }
    }
}

/// A joined (or joining) consumer of the distribution feed.
pub struct Consumer<C, F> {
    conn: C,
    feed: F,
    session: JoinSession,
    config: ConsumerConfig,
    events: SpscSender<SessionEvent>,
    next_request_id: u64,
}

impl<C, F> Consumer<C, F>
where
    C: RequestConnection,
    F: FeedSubscriber,
{
    /// Creates a consumer over a request connection and a feed
    /// subscription.
    ///
    /// # Returns
    /// The consumer and the event stream the application polls.
    #[must_use]
    pub fn new(conn: C, feed: F, config: ConsumerConfig) -> (Self, SpscReceiver<SessionEvent>) {
        let (events, event_rx) = spsc::channel(config.event_capacity);
        let consumer = Self {
            conn,
            feed,
            session: JoinSession::new(config.join_buffer_capacity),
            config,
            events,
            next_request_id: 1,
        };
        (consumer, event_rx)
    }

    /// Read handle over the consumer's view.
    #[must_use]
    pub fn view(&self) -> SharedView {
        self.session.view()
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Runs the join protocol until the session is live.
    ///
    /// Each attempt sends a snapshot request with a fresh request id and
    /// keeps buffering feed incrementals while waiting; a late response to
    /// a superseded request is ignored.
    ///
    /// # Errors
    /// Returns [`ClientError::SnapshotTimeout`] when all attempts are
    /// exhausted, or the underlying transport error.
    pub async fn join(&mut self) -> Result<(), ClientError> {
        for _ in 0..self.config.max_snapshot_attempts {
            let request_id = self.next_request_id;
            self.next_request_id += 1;

            let events = self.session.begin_join(request_id);
            self.emit(events);

            let request = SnapshotRequest { request_id };
            let mut buf = vec![0u8; SnapshotRequest::FRAME_LENGTH];
            request.encode(&mut buf)?;
            self.conn.send(&buf).await?;

            let deadline = tokio::time::sleep(self.config.snapshot_timeout);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    frame = self.feed.next_frame() => {
                        self.on_feed_frame(frame?);
                    }

                    result = self.conn.recv() => {
                        match result? {
                            Some(frame) => {
                                self.on_conn_frame(&frame);
                                if self.session.state() == SessionState::Live {
                                    return Ok(());
                                }
                            }
                            None => return Err(ClientError::Closed),
                        }
                    }

                    _ = &mut deadline => {
                        tracing::warn!(request_id, "snapshot request timed out, retrying");
                        break;
                    }
                }
            }
        }
        Err(ClientError::SnapshotTimeout {
            attempts: self.config.max_snapshot_attempts,
        })
    }

    /// Pumps the live feed until it ends.
    ///
    /// # Errors
    /// Returns the transport error that ended the feed; an orderly close
    /// is `Ok`.
    pub async fn run(mut self) -> Result<(), ClientError> {
        loop {
            match self.feed.next_frame().await {
                Ok(frame) => {
                    let gap = self.on_feed_frame(frame);
                    if gap && self.config.resnapshot_on_gap {
                        tracing::info!("gap detected, re-running join protocol");
                        self.join().await?;
                    }
                }
                Err(TransportError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Decodes and applies one feed frame. Returns true if a gap was
    /// detected.
    fn on_feed_frame(&mut self, frame: bytes::Bytes) -> bool {
        let update = match PriceUpdate::decode(&frame[..]) {
            Ok(update) => update,
            Err(e) => {
                // A lossy feed can hand us anything; drop and move on.
                tracing::warn!(error = %e, "dropping malformed feed frame");
                return false;
            }
        };
        let events = self.session.on_update(update.record);
        let gap = events
            .iter()
            .any(|e| matches!(e, SessionEvent::GapDetected { .. }));
        self.emit(events);
        gap
    }

    fn on_conn_frame(&mut self, frame: &[u8]) {
        match Message::decode(frame) {
            Ok(Message::SnapshotResponse(response)) => {
                let events = self.session.on_snapshot(&response);
                self.emit(events);
            }
            Ok(other) => {
                tracing::warn!(
                    message_type = other.message_type(),
                    "ignoring unexpected frame on request channel"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed frame on request channel");
            }
        }
    }

    fn emit(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            if self.events.send(event).is_err() {
                // The application stopped polling; the view stays correct.
                tracing::warn!("event stream full or closed, dropping event");
            }
        }
    }
}
