//! # pricecast Channel
//!
//! Channel primitives used by the distribution engine's internal paths.
//!
//! This crate provides:
//! - [`spsc`] - Lock-free single-producer single-consumer ring, used for the
//!   join-protocol buffer and per-consumer event streams
//! - [`mpsc`] - Bounded multi-producer single-consumer channel, used for
//!   command/event plumbing around the server loop
//! - [`broadcast`] - One-to-many buffered broadcast, used to fan out
//!   incremental updates to in-process subscribers

pub mod broadcast;
pub mod mpsc;
pub mod spsc;

pub use broadcast::{BroadcastReceiver, BroadcastSender};
pub use mpsc::{MpscReceiver, MpscSender};
pub use spsc::{SpscReceiver, SpscSender};

/// Error type for channel send operations. The rejected item is returned so
/// the caller can decide whether to drop or retry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError<T> {
    /// Channel is at capacity.
    Full(T),
    /// The other half was dropped.
    Closed(T),
}

impl<T> ChannelError<T> {
    /// Recovers the item that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }
}

impl<T> std::fmt::Display for ChannelError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(_) => write!(f, "channel full"),
            Self::Closed(_) => write!(f, "channel closed"),
        }
    }
}

impl<T: std::fmt::Debug> std::error::Error for ChannelError<T> {}
