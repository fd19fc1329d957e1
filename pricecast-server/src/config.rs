//! Server engine configuration.

use crate::error::ServerError;
use std::time::Duration;

/// Configuration for the distribution engine.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of distinct instruments the store holds.
    pub instrument_capacity: usize,
    /// Maximum number of records in one batch upload chunk.
    pub max_chunk_size: usize,
    /// Maximum number of concurrently open batch runs.
    pub max_active_batches: usize,
    /// Idle time after which an open batch run is evicted.
    pub batch_eviction_timeout: Duration,
    /// Depth of the internal command channel.
    pub channel_capacity: usize,
    /// Maximum accepted inbound frame size in bytes. Enforced on the
    /// dispatch path, so it holds on every transport.
    pub max_frame_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instrument_capacity: 100_000,
            max_chunk_size: 1_000,
            max_active_batches: 100,
            batch_eviction_timeout: Duration::from_millis(5_000),
            channel_capacity: 4_096,
            max_frame_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Creates a config with the given instrument capacity and defaults for
    /// everything else.
    #[must_use]
    pub fn new(instrument_capacity: usize) -> Self {
        Self {
            instrument_capacity,
            ..Default::default()
        }
    }

    /// Sets the maximum batch chunk size.
    #[must_use]
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Sets the maximum number of open batch runs.
    #[must_use]
    pub fn max_active_batches(mut self, max: usize) -> Self {
        self.max_active_batches = max;
        self
    }

    /// Sets the batch eviction timeout.
    #[must_use]
    pub fn batch_eviction_timeout(mut self, timeout: Duration) -> Self {
        self.batch_eviction_timeout = timeout;
        self
    }

    /// Sets the command channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the maximum inbound frame size.
    #[must_use]
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`ServerError::Config`] if any limit is zero.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.instrument_capacity == 0 {
            return Err(ServerError::config("instrument_capacity must be positive"));
        }
        if self.max_chunk_size == 0 {
            return Err(ServerError::config("max_chunk_size must be positive"));
        }
        if self.max_active_batches == 0 {
            return Err(ServerError::config("max_active_batches must be positive"));
        }
        if self.channel_capacity == 0 {
            return Err(ServerError::config("channel_capacity must be positive"));
        }
        if self.max_frame_size == 0 {
            return Err(ServerError::config("max_frame_size must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.max_chunk_size, 1_000);
        assert_eq!(config.max_active_batches, 100);
        assert_eq!(config.batch_eviction_timeout, Duration::from_millis(5_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ServerConfig::new(16)
            .max_chunk_size(10)
            .max_active_batches(2)
            .batch_eviction_timeout(Duration::from_millis(100));

        assert_eq!(config.instrument_capacity, 16);
        assert_eq!(config.max_chunk_size, 10);
        assert_eq!(config.max_active_batches, 2);
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        assert!(ServerConfig::new(0).validate().is_err());
        assert!(ServerConfig::new(8).max_chunk_size(0).validate().is_err());
        assert!(ServerConfig::new(8).max_frame_size(0).validate().is_err());
        assert!(
            ServerConfig::new(8)
                .max_active_batches(0)
                .validate()
                .is_err()
        );
    }
}
