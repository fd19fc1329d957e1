//! # pricecast Client
//!
//! Client-side engine for the last-price distribution protocol.
//!
//! This crate provides:
//! - A consumer that joins the feed mid-stream via the snapshot protocol
//! - A local last-value view maintained under the strictly-greater rule
//! - Gap detection and a session event stream for the application
//! - A producer-side batch client for staged uploads

pub mod batch;
pub mod consumer;
pub mod error;
pub mod session;
pub mod view;

pub use batch::BatchClient;
pub use consumer::{Consumer, ConsumerConfig};
pub use error::ClientError;
pub use session::{JoinSession, SessionEvent, SessionState, SharedView};
pub use view::{LastValueView, ViewApply, ViewEntry};
