//! # pricecast Server
//!
//! Server-side engine for the last-price distribution protocol.
//!
//! This crate provides:
//! - [`ingest`] - The single-writer ingest path stamping and applying
//!   updates
//! - [`snapshot`] - Snapshot service for joining consumers
//! - [`batch`] - Staged batch runs merged through the ingest path
//! - [`dispatcher`] - Frame routing by message type
//! - [`builder`] - Engine assembly, run loop and control handle

pub mod batch;
pub mod builder;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ingest;
pub mod snapshot;

pub use batch::{BatchRunRepository, StagedPrice};
pub use builder::{EngineStats, LastPriceServer, ServerBuilder, ServerHandle};
pub use config::ServerConfig;
pub use dispatcher::{DispatchOutcome, DispatchStats, RequestDispatcher};
pub use error::ServerError;
pub use ingest::{IngestEngine, IngestStats};
pub use snapshot::SnapshotService;
