//! # pricecast Transport
//!
//! Transport layer for the distribution engine.
//!
//! This crate provides:
//! - [`traits`] - The [`FeedPublisher`]/[`FeedSubscriber`] and
//!   [`RequestConnection`]/[`RequestListener`] seams the engine is written
//!   against
//! - [`udp`] - Lossy multicast feed transport
//! - [`tcp`] - Framed TCP request/response transport
//! - [`loopback`] - In-process transport for tests and embedded consumers

pub mod error;
pub mod loopback;
pub mod tcp;
pub mod traits;
pub mod udp;

pub use error::TransportError;
pub use traits::{FeedPublisher, FeedSubscriber, RequestConnection, RequestListener};
