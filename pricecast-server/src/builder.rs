//! Server builder and main engine loop.
//!
//! All state mutation happens on the engine task: session tasks and feed
//! forwarders only move raw frames over channels, so the store's single
//! writer never leaves one task.

use crate::batch::BatchRunRepository;
use crate::config::ServerConfig;
use crate::dispatcher::{DispatchStats, RequestDispatcher};
use crate::error::ServerError;
use crate::ingest::{IngestEngine, IngestStats};
use crate::snapshot::SnapshotService;
use bytes::Bytes;
use pricecast_core::PriceUpdate;
use pricecast_store::PriceStore;
use pricecast_transport::{FeedPublisher, FeedSubscriber, RequestConnection, RequestListener};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

/// Builder for configuring and creating the engine.
pub struct ServerBuilder {
    config: ServerConfig,
    publisher: Option<Arc<dyn FeedPublisher>>,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            publisher: None,
        }
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the feed publisher stamped updates are republished on.
    #[must_use]
    pub fn publisher(mut self, publisher: Arc<dyn FeedPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Builds the engine and its control handle around a request listener.
    ///
    /// # Errors
    /// Returns [`ServerError::Config`] if the configuration is invalid or
    /// no publisher was set.
    pub fn build<L>(self, listener: L) -> Result<(LastPriceServer<L>, ServerHandle), ServerError>
    where
        L: RequestListener,
    {
        self.config.validate()?;
        let publisher = self
            .publisher
            .ok_or_else(|| ServerError::config("feed publisher required"))?;

        let (writer, store) = PriceStore::with_capacity(self.config.instrument_capacity);
        let dispatcher = RequestDispatcher::new(
            SnapshotService::new(Arc::clone(&store)),
            BatchRunRepository::new(
                self.config.max_active_batches,
                self.config.max_chunk_size,
                self.config.batch_eviction_timeout,
            ),
            self.config.max_frame_size,
        );

        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.channel_capacity);
        let (frame_tx, frame_rx) = mpsc::channel(self.config.channel_capacity);

        let server = LastPriceServer {
            listener,
            publisher,
            ingest: IngestEngine::new(writer),
            dispatcher,
            store,
            cmd_rx,
            frame_rx,
            frame_tx,
        };
        let handle = ServerHandle { cmd_tx };

        Ok((server, handle))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One frame arriving at the engine, with an optional reply path.
struct InboundFrame {
    frame: Bytes,
    reply: Option<mpsc::Sender<Bytes>>,
}

/// Commands that can be sent to the engine.
enum ServerCommand {
    Shutdown,
    Stats(oneshot::Sender<EngineStats>),
}

/// Point-in-time engine counters.
#[derive(Debug, Clone, Copy)]
pub struct EngineStats {
    /// Ingest path counters.
    pub ingest: IngestStats,
    /// Dispatch path counters.
    pub dispatch: DispatchStats,
    /// Currently open batch runs.
    pub open_batches: usize,
    /// Instruments seen so far.
    pub instruments: usize,
}

/// The last-price distribution engine.
pub struct LastPriceServer<L: RequestListener> {
    listener: L,
    publisher: Arc<dyn FeedPublisher>,
    ingest: IngestEngine,
    dispatcher: RequestDispatcher,
    store: Arc<PriceStore>,
    cmd_rx: mpsc::Receiver<ServerCommand>,
    frame_rx: mpsc::Receiver<InboundFrame>,
    frame_tx: mpsc::Sender<InboundFrame>,
}

impl<L> LastPriceServer<L>
where
    L: RequestListener,
    L::Conn: 'static,
{
    /// Shared read handle to the live store.
    #[must_use]
    pub fn store(&self) -> Arc<PriceStore> {
        Arc::clone(&self.store)
    }

    /// Attaches an inbound feed of producer updates. Frames from the
    /// subscriber flow into the engine like request frames, minus a reply
    /// path.
    pub fn attach_feed(&self, mut subscriber: Box<dyn FeedSubscriber>) {
        let frame_tx = self.frame_tx.clone();
        tokio::spawn(async move {
            loop {
                match subscriber.next_frame().await {
                    Ok(frame) => {
                        if frame_tx
                            .send(InboundFrame { frame, reply: None })
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::info!(error = %e, "inbound feed ended");
                        return;
                    }
                }
            }
        });
    }

    /// Runs the engine until shutdown.
    ///
    /// # Errors
    /// Returns [`ServerError`] if the engine loop fails; per-session and
    /// per-frame problems are logged and survived.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("engine running");
        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok(conn) => {
                            let frame_tx = self.frame_tx.clone();
                            tokio::spawn(run_session(conn, frame_tx));
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "accept failed");
                        }
                    }
                }

                Some(inbound) = self.frame_rx.recv() => {
                    self.handle_frame(inbound).await;
                }

                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(ServerCommand::Stats(reply)) => {
                            let _ = reply.send(self.stats());
                        }
                        Some(ServerCommand::Shutdown) | None => {
                            tracing::info!("engine shutting down");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn handle_frame(&mut self, inbound: InboundFrame) {
        let outcome =
            match self
                .dispatcher
                .dispatch(&mut self.ingest, &inbound.frame, Instant::now())
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "dispatch failed");
                    return;
                }
            };

        if let Some(response) = outcome.response
            && let Some(reply) = inbound.reply
        {
            // A gone session is its task's problem, not the engine's.
            let _ = reply.send(Bytes::from(response)).await;
        }

        let mut frame = [0u8; PriceUpdate::FRAME_LENGTH];
        for record in outcome.published {
            let update = PriceUpdate { record };
            if let Err(e) = update.encode(&mut frame[..]) {
                tracing::error!(error = %e, "update encode failed");
                continue;
            }
            if let Err(e) = self.publisher.publish(&frame).await {
                tracing::error!(error = %e, "feed publish failed");
            }
        }
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            ingest: self.ingest.stats(),
            dispatch: self.dispatcher.stats(),
            open_batches: self.dispatcher.open_batches(),
            instruments: self.store.len(),
        }
    }
}

/// Handle for controlling the engine from outside.
#[derive(Clone)]
pub struct ServerHandle {
    cmd_tx: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    /// Requests engine shutdown.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.try_send(ServerCommand::Shutdown);
    }

    /// Fetches current engine counters.
    ///
    /// # Returns
    /// `None` if the engine is already gone.
    pub async fn stats(&self) -> Option<EngineStats> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx.send(ServerCommand::Stats(tx)).await.ok()?;
        rx.await.ok()
    }
}

/// Pumps one request session: inbound frames to the engine, replies back
/// to the peer.
async fn run_session<C: RequestConnection>(mut conn: C, frame_tx: mpsc::Sender<InboundFrame>) {
    let (reply_tx, mut reply_rx) = mpsc::channel::<Bytes>(64);
    loop {
        tokio::select! {
            result = conn.recv() => {
                match result {
                    Ok(Some(frame)) => {
                        let inbound = InboundFrame {
                            frame,
                            reply: Some(reply_tx.clone()),
                        };
                        if frame_tx.send(inbound).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("session disconnected");
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "session read failed");
                        return;
                    }
                }
            }

            Some(reply) = reply_rx.recv() => {
                if let Err(e) = conn.send(&reply).await {
                    tracing::warn!(error = %e, "session write failed");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricecast_core::messages::{
        CompleteBatchRequest, CompleteBatchResponse, SnapshotRequest, SnapshotResponse,
        StartBatchRequest, StartBatchResponse, UploadChunkRequest,
    };
    use pricecast_core::{PriceRecord, Status};
    use pricecast_transport::loopback;

    fn update_frame(instrument_id: u32, price: i64, source_timestamp: u64) -> Vec<u8> {
        let update = PriceUpdate {
            record: PriceRecord {
                instrument_id,
                sequence: 0,
                price,
                source_timestamp,
            },
        };
        let mut buf = vec![0u8; PriceUpdate::FRAME_LENGTH];
        update.encode(&mut buf).unwrap();
        buf
    }

    #[tokio::test]
    async fn test_builder_requires_publisher() {
        let (_connector, listener) = loopback::request_channel(4);
        assert!(matches!(
            ServerBuilder::new().build(listener),
            Err(ServerError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_over_loopback() {
        let feed = loopback::feed(64);
        let (connector, listener) = loopback::request_channel(16);
        let (server, handle) = ServerBuilder::new()
            .config(ServerConfig::new(16))
            .publisher(Arc::new(feed.clone()))
            .build(listener)
            .unwrap();
        let engine = tokio::spawn(server.run());

        let mut conn = connector.connect().await.unwrap();

        conn.send(&update_frame(1, 100, 5)).await.unwrap();

        let mut buf = vec![0u8; SnapshotRequest::FRAME_LENGTH];
        SnapshotRequest { request_id: 3 }.encode(&mut buf).unwrap();
        conn.send(&buf).await.unwrap();

        let frame = conn.recv().await.unwrap().unwrap();
        let response = SnapshotResponse::decode(&frame[..]).unwrap();
        assert_eq!(response.request_id, 3);
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].price, 100);
        assert_eq!(response.entries[0].sequence, 1);

        handle.shutdown();
        engine.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_update_republished_on_feed() {
        let feed = loopback::feed(64);
        let mut subscriber = feed.subscribe();
        let (connector, listener) = loopback::request_channel(16);
        let (server, handle) = ServerBuilder::new()
            .config(ServerConfig::new(16))
            .publisher(Arc::new(feed.clone()))
            .build(listener)
            .unwrap();
        let engine = tokio::spawn(server.run());

        let mut conn = connector.connect().await.unwrap();
        conn.send(&update_frame(7, 250, 9)).await.unwrap();

        let frame = subscriber.next_frame().await.unwrap();
        let update = PriceUpdate::decode(&frame[..]).unwrap();
        assert_eq!(update.record.instrument_id, 7);
        assert_eq!(update.record.sequence, 1);
        assert_eq!(update.record.price, 250);

        handle.shutdown();
        engine.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_batch_start_over_loopback() {
        let feed = loopback::feed(64);
        let (connector, listener) = loopback::request_channel(16);
        let (server, handle) = ServerBuilder::new()
            .config(ServerConfig::new(16))
            .publisher(Arc::new(feed))
            .build(listener)
            .unwrap();
        let engine = tokio::spawn(server.run());

        let mut conn = connector.connect().await.unwrap();
        let mut buf = vec![0u8; StartBatchRequest::FRAME_LENGTH];
        StartBatchRequest.encode(&mut buf).unwrap();
        conn.send(&buf).await.unwrap();

        let frame = conn.recv().await.unwrap().unwrap();
        let response = StartBatchResponse::decode(&frame[..]).unwrap();
        assert_eq!(response.status, Status::Ok);
        assert!(response.batch_id > 0);

        handle.shutdown();
        engine.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_attach_feed_ingests_updates() {
        let outbound = loopback::feed(64);
        let mut republished = outbound.subscribe();
        let inbound = loopback::feed(64);
        let (_connector, listener) = loopback::request_channel(16);
        let (server, handle) = ServerBuilder::new()
            .config(ServerConfig::new(16))
            .publisher(Arc::new(outbound))
            .build(listener)
            .unwrap();
        server.attach_feed(Box::new(inbound.subscribe()));
        let engine = tokio::spawn(server.run());

        inbound.publish(&update_frame(5, 300, 2)).await.unwrap();

        // The producer update comes back stamped on the outbound feed.
        let frame = republished.next_frame().await.unwrap();
        let update = PriceUpdate::decode(&frame[..]).unwrap();
        assert_eq!(update.record.instrument_id, 5);
        assert_eq!(update.record.sequence, 1);
        assert_eq!(update.record.price, 300);

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.ingest.applied, 1);

        handle.shutdown();
        engine.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_frame_size_limit_holds_over_loopback() {
        let feed = loopback::feed(64);
        let (connector, listener) = loopback::request_channel(16);
        let (server, handle) = ServerBuilder::new()
            .config(ServerConfig::new(16).max_frame_size(64))
            .publisher(Arc::new(feed))
            .build(listener)
            .unwrap();
        let engine = tokio::spawn(server.run());

        let mut conn = connector.connect().await.unwrap();
        let mut buf = vec![0u8; StartBatchRequest::FRAME_LENGTH];
        StartBatchRequest.encode(&mut buf).unwrap();
        conn.send(&buf).await.unwrap();
        let frame = conn.recv().await.unwrap().unwrap();
        let start = StartBatchResponse::decode(&frame[..]).unwrap();
        assert_eq!(start.status, Status::Ok);

        // A chunk far past the limit is dropped without an ack; loopback
        // has no codec of its own, so the engine check is what holds.
        let upload = UploadChunkRequest {
            batch_id: start.batch_id,
            records: (0..100)
                .map(|i| PriceRecord {
                    instrument_id: i,
                    sequence: 0,
                    price: 1,
                    source_timestamp: 1,
                })
                .collect(),
        };
        let mut buf = vec![0u8; upload.frame_length()];
        upload.encode(&mut buf).unwrap();
        conn.send(&buf).await.unwrap();

        let mut buf = vec![0u8; CompleteBatchRequest::FRAME_LENGTH];
        CompleteBatchRequest {
            batch_id: start.batch_id,
        }
        .encode(&mut buf)
        .unwrap();
        conn.send(&buf).await.unwrap();
        let frame = conn.recv().await.unwrap().unwrap();
        let ack = CompleteBatchResponse::decode(&frame[..]).unwrap();
        assert_eq!(ack.status, Status::Ok);

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.dispatch.oversized, 1);
        assert_eq!(stats.ingest.applied, 0);
        assert_eq!(stats.instruments, 0);

        handle.shutdown();
        engine.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stats_command() {
        let feed = loopback::feed(64);
        let (connector, listener) = loopback::request_channel(16);
        let (server, handle) = ServerBuilder::new()
            .config(ServerConfig::new(16))
            .publisher(Arc::new(feed))
            .build(listener)
            .unwrap();
        let engine = tokio::spawn(server.run());

        let mut conn = connector.connect().await.unwrap();
        conn.send(&update_frame(1, 100, 5)).await.unwrap();
        // Round-trip a snapshot so the update is known to be processed.
        let mut buf = vec![0u8; SnapshotRequest::FRAME_LENGTH];
        SnapshotRequest { request_id: 1 }.encode(&mut buf).unwrap();
        conn.send(&buf).await.unwrap();
        let _ = conn.recv().await.unwrap().unwrap();

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.ingest.applied, 1);
        assert_eq!(stats.instruments, 1);

        handle.shutdown();
        engine.await.unwrap().unwrap();
    }
}
