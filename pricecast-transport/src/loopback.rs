//! In-process loopback transport.
//!
//! Implements both transport seams over tokio channels so a full
//! server/client pair can run inside one process. Used heavily in tests;
//! also useful for embedding a consumer next to the engine.

use crate::error::TransportError;
use crate::traits::{FeedPublisher, FeedSubscriber, RequestConnection, RequestListener};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};

/// Creates an in-process feed with the given per-subscriber buffer depth.
///
/// A subscriber that falls more than `capacity` frames behind loses the
/// oldest frames, mirroring datagram loss on a real feed.
#[must_use]
pub fn feed(capacity: usize) -> LoopbackFeed {
    let (tx, _) = broadcast::channel(capacity);
    LoopbackFeed { tx }
}

/// Publisher side of an in-process feed.
#[derive(Clone)]
pub struct LoopbackFeed {
    tx: broadcast::Sender<Bytes>,
}

impl LoopbackFeed {
    /// Creates a subscriber starting at the next published frame.
    #[must_use]
    pub fn subscribe(&self) -> LoopbackFeedSubscriber {
        LoopbackFeedSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl FeedPublisher for LoopbackFeed {
    async fn publish(&self, frame: &[u8]) -> Result<(), TransportError> {
        // A feed with no subscribers is fine; frames just vanish.
        let _ = self.tx.send(Bytes::copy_from_slice(frame));
        Ok(())
    }
}

/// Subscriber side of an in-process feed.
pub struct LoopbackFeedSubscriber {
    rx: broadcast::Receiver<Bytes>,
}

#[async_trait]
impl FeedSubscriber for LoopbackFeedSubscriber {
    async fn next_frame(&mut self) -> Result<Bytes, TransportError> {
        loop {
            match self.rx.recv().await {
                Ok(frame) => return Ok(frame),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "loopback feed subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }
}

/// Creates an in-process request channel.
///
/// # Returns
/// A cloneable connector for clients and the listener for the server.
#[must_use]
pub fn request_channel(capacity: usize) -> (LoopbackConnector, LoopbackListener) {
    let (tx, rx) = mpsc::channel(16);
    (
        LoopbackConnector { tx, capacity },
        LoopbackListener { rx },
    )
}

/// Client-side handle that opens in-process request connections.
#[derive(Clone)]
pub struct LoopbackConnector {
    tx: mpsc::Sender<LoopbackConnection>,
    capacity: usize,
}

impl LoopbackConnector {
    /// Opens a new connection to the listener.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectionClosed`] if the listener is gone.
    pub async fn connect(&self) -> Result<LoopbackConnection, TransportError> {
        let (client_tx, server_rx) = mpsc::channel(self.capacity);
        let (server_tx, client_rx) = mpsc::channel(self.capacity);

        self.tx
            .send(LoopbackConnection {
                tx: server_tx,
                rx: server_rx,
            })
            .await
            .map_err(|_| TransportError::ConnectionClosed)?;

        Ok(LoopbackConnection {
            tx: client_tx,
            rx: client_rx,
        })
    }
}

/// Server-side listener for in-process connections.
pub struct LoopbackListener {
    rx: mpsc::Receiver<LoopbackConnection>,
}

#[async_trait]
impl RequestListener for LoopbackListener {
    type Conn = LoopbackConnection;

    async fn accept(&mut self) -> Result<LoopbackConnection, TransportError> {
        self.rx
            .recv()
            .await
            .ok_or(TransportError::ConnectionClosed)
    }
}

/// One half of an in-process framed connection.
pub struct LoopbackConnection {
    tx: mpsc::Sender<Bytes>,
    rx: mpsc::Receiver<Bytes>,
}

#[async_trait]
impl RequestConnection for LoopbackConnection {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send(Bytes::copy_from_slice(frame))
            .await
            .map_err(|_| TransportError::ConnectionClosed)
    }

    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError> {
        Ok(self.rx.recv().await)
    }
}
