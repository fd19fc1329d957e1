//! # pricecast Store
//!
//! The in-memory last-value store at the heart of the distribution engine.
//!
//! One writer thread applies updates; any number of reader threads take
//! point lookups and full snapshots without locks. All memory is allocated
//! up front for a fixed instrument capacity, so the apply path never
//! allocates.
//!
//! This crate provides:
//! - [`PriceStore`] / [`StoreWriter`] - The store and its unique writer
//! - [`LastValueEntry`] / [`Snapshot`] - Read-side value types
//! - [`Upsert`] - Apply outcome for pre-stamped records
//! - [`StoreError`] - Error types

pub mod entry;
pub mod error;
pub mod store;

mod index;
mod sequencer;
mod slot;

pub use entry::{LastValueEntry, Snapshot};
pub use error::{Result, StoreError};
pub use store::{PriceStore, StoreWriter, Upsert};
