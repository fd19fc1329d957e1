//! Error types for the price store.

use thiserror::Error;

/// Errors returned by store write operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store was created with a fixed instrument capacity and a write
    /// targeted an instrument that would exceed it.
    #[error("instrument capacity exhausted ({capacity} instruments configured)")]
    CapacityExhausted {
        /// Configured instrument capacity
        capacity: usize,
    },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
