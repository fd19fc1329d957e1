//! Transport traits.
//!
//! The engine is written against these seams so the same server and client
//! code runs over UDP multicast, TCP, or the in-process loopback.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// One-way publisher for the incremental feed.
#[async_trait]
pub trait FeedPublisher: Send + Sync {
    /// Publishes one complete wire frame. Best-effort: the feed may drop,
    /// reorder, or duplicate frames downstream.
    ///
    /// # Errors
    /// Returns [`TransportError`] if the frame could not be handed to the
    /// transport at all.
    async fn publish(&self, frame: &[u8]) -> Result<(), TransportError>;
}

/// One-way consumer for the incremental feed.
#[async_trait]
pub trait FeedSubscriber: Send {
    /// Waits for the next wire frame.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectionClosed`] when the feed ends.
    async fn next_frame(&mut self) -> Result<Bytes, TransportError>;
}

/// Bidirectional framed connection for the request/response path
/// (snapshots and batch runs).
#[async_trait]
pub trait RequestConnection: Send {
    /// Sends one complete wire frame.
    ///
    /// # Errors
    /// Returns [`TransportError`] if the peer is gone or the frame is
    /// oversized.
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Receives the next wire frame.
    ///
    /// # Returns
    /// `Ok(None)` on orderly close.
    ///
    /// # Errors
    /// Returns [`TransportError`] on transport failure.
    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError>;
}

/// Accepts inbound request connections.
#[async_trait]
pub trait RequestListener: Send {
    /// Connection type produced by this listener.
    type Conn: RequestConnection + 'static;

    /// Waits for the next inbound connection.
    ///
    /// # Errors
    /// Returns [`TransportError`] if the listener failed.
    async fn accept(&mut self) -> Result<Self::Conn, TransportError>;
}
