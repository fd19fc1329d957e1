//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use pricecast::prelude::*;
//! ```

// Core types
pub use pricecast_core::{
    CodecError, FrameHeader, InstrumentId, Message, PriceRecord, PriceUpdate,
    SnapshotRequest, SnapshotResponse, Status,
};

// Channel types
pub use pricecast_channel::{MpscReceiver, MpscSender, SpscReceiver, SpscSender};
pub use pricecast_channel::{broadcast, mpsc, spsc};

// Store types
pub use pricecast_store::{LastValueEntry, PriceStore, Snapshot, StoreWriter, Upsert};

// Transport types
pub use pricecast_transport::{
    FeedPublisher, FeedSubscriber, RequestConnection, RequestListener, TransportError,
    loopback,
};
pub use pricecast_transport::tcp::{
    TcpClientConfig, TcpRequestClient, TcpRequestServer, TcpServerConfig,
};
pub use pricecast_transport::udp::{MulticastConfig, MulticastPublisher, MulticastSubscriber};

// Server types
pub use pricecast_server::{
    EngineStats, LastPriceServer, ServerBuilder, ServerConfig, ServerError, ServerHandle,
};

// Client types
pub use pricecast_client::{
    BatchClient, ClientError, Consumer, ConsumerConfig, SessionEvent, SessionState,
    SharedView,
};
