//! Latency measurement utilities.

use hdrhistogram::Histogram;
use std::time::Instant;

/// Latency percentiles in nanoseconds.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    /// Minimum latency.
    pub min: u64,
    /// Maximum latency.
    pub max: u64,
    /// Mean latency.
    pub mean: f64,
    /// Median latency (p50).
    pub median: u64,
    /// 99th percentile latency.
    pub p99: u64,
    /// 99.9th percentile latency.
    pub p999: u64,
    /// Sample count.
    pub count: u64,
}

/// Records latency samples into an HDR histogram and computes percentiles.
pub struct LatencyRecorder {
    histogram: Histogram<u64>,
}

impl LatencyRecorder {
    /// Creates a recorder covering 1ns to 10s with 3 significant digits.
    ///
    /// # Panics
    /// Panics if the histogram bounds are rejected, which cannot happen
    /// with these constants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            histogram: Histogram::new_with_bounds(1, 10_000_000_000, 3)
                .expect("valid histogram bounds"),
        }
    }

    /// Records one latency sample in nanoseconds.
    pub fn record(&mut self, nanos: u64) {
        self.histogram.saturating_record(nanos.max(1));
    }

    /// Measures the latency of a function and records it.
    pub fn measure<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        self.record(start.elapsed().as_nanos() as u64);
        result
    }

    /// Computes statistics from the recorded samples.
    #[must_use]
    pub fn stats(&self) -> Option<LatencyStats> {
        if self.histogram.is_empty() {
            return None;
        }
        Some(LatencyStats {
            min: self.histogram.min(),
            max: self.histogram.max(),
            mean: self.histogram.mean(),
            median: self.histogram.value_at_quantile(0.5),
            p99: self.histogram.value_at_quantile(0.99),
            p999: self.histogram.value_at_quantile(0.999),
            count: self.histogram.len(),
        })
    }

    /// Clears all samples.
    pub fn clear(&mut self) {
        self.histogram.reset();
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    /// Returns true if no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}
