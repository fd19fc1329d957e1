//! # pricecast
//!
//! Low-latency last-price distribution engine for Rust.
//!
//! pricecast keeps the newest price per instrument in a lock-free in-memory
//! store, fans incrementals out over a lossy feed, and lets consumers join
//! mid-stream through a snapshot/reconcile protocol.
//!
//! ## Features
//!
//! - **Single-writer last-value store** - Seqlock slots, readers never block
//! - **Per-instrument sequencing** - Stale and duplicated updates fall out
//!   at every layer under one strictly-greater rule
//! - **Seamless joins** - Consumers buffer incrementals, load a snapshot,
//!   and reconcile without missing or double-applying an update
//! - **Staged batch uploads** - Producers stage whole pricing runs and merge
//!   them atomically through the ingest path
//! - **Flexible transport** - UDP multicast feed, framed TCP requests, and
//!   an in-process loopback for tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use pricecast::prelude::*;
//!
//! // Assemble a server over an in-process transport
//! let feed = loopback::feed(1024);
//! let (connector, listener) = loopback::request_channel(64);
//! let (server, handle) = ServerBuilder::new()
//!     .config(ServerConfig::new(100_000))
//!     .publisher(Arc::new(feed.clone()))
//!     .build(listener)?;
//! tokio::spawn(server.run());
//!
//! // Join a consumer mid-stream
//! let conn = connector.connect().await?;
//! let (mut consumer, events) =
//!     Consumer::new(conn, feed.subscribe(), ConsumerConfig::default());
//! consumer.join().await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Wire codec, frame header, buffer traits
//! - [`channel`] - High-performance channels (SPSC, MPSC, broadcast)
//! - [`store`] - The in-memory last-value store
//! - [`transport`] - Feed and request transports (UDP, TCP, loopback)
//! - [`server`] - Server-side engine
//! - [`client`] - Client-side engine

pub mod prelude;

/// Wire codec and core types.
pub mod core {
    pub use pricecast_core::*;
}

/// High-performance channel implementations.
pub mod channel {
    pub use pricecast_channel::*;
}

/// The in-memory last-value store.
pub mod store {
    pub use pricecast_store::*;
}

/// Feed and request transports.
pub mod transport {
    pub use pricecast_transport::*;
}

/// Server-side engine.
pub mod server {
    pub use pricecast_server::*;
}

/// Client-side engine.
pub mod client {
    pub use pricecast_client::*;
}

// Re-export commonly used items at the crate root
pub use pricecast_core::{
    FrameHeader, InstrumentId, Message, PriceRecord, PriceUpdate, SnapshotRequest,
    SnapshotResponse, Status,
};

pub use pricecast_channel::{broadcast, mpsc, spsc};

pub use pricecast_store::{LastValueEntry, PriceStore, Snapshot, StoreWriter};

pub use pricecast_client::{BatchClient, Consumer, ConsumerConfig};
pub use pricecast_server::{ServerBuilder, ServerConfig, ServerHandle};
