//! # pricecast Bench
//!
//! Benchmarking utilities for pricecast performance testing.

pub mod latency;
pub mod workload;
