//! UDP transport for the incremental feed.

pub mod multicast;

pub use multicast::{MulticastConfig, MulticastPublisher, MulticastSubscriber};
