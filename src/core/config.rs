//! # Bus configuration.
//!
//! Provides [`BusConfig`] centralized settings for the bus runtime.
//!
//! ## Sentinel values
//! - `max_concurrent_queries = 0` → unlimited (no semaphore created)
//! - `grace = 0s` → shutdown does not wait for stopped signals

use std::time::Duration;

/// Global configuration for the bus runtime.
///
/// ## Field semantics
/// - `grace`: Maximum wait for subscribers to signal they stopped
/// - `max_concurrent_queries`: Concurrency cap for multi-query fan-out (`0` = unlimited)
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum time to wait for graceful shutdown.
    ///
    /// When shutdown starts:
    /// - the bus context is cancelled
    /// - the bus waits up to `grace` for every stopped signal
    /// - subscribers still running afterwards are abandoned
    pub grace: Duration,

    /// Maximum number of queries of one `exec_multi_query` call in flight at once.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` queries are processed simultaneously
    pub max_concurrent_queries: usize,
}

impl BusConfig {
    /// Returns the multi-query concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` concurrent queries
    #[inline]
    pub fn query_concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent_queries == 0 {
            None
        } else {
            Some(self.max_concurrent_queries)
        }
    }

    /// Returns a config with the given grace and default limits.
    pub fn with_grace(grace: Duration) -> Self {
        Self {
            grace,
            ..Self::default()
        }
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `grace = 60s` (reasonable graceful shutdown window)
    /// - `max_concurrent_queries = 0` (unlimited)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            max_concurrent_queries: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BusConfig::default();
        assert_eq!(cfg.grace, Duration::from_secs(60));
        assert_eq!(cfg.query_concurrency_limit(), None);
    }

    #[test]
    fn test_limit_sentinel() {
        let mut cfg = BusConfig::with_grace(Duration::from_secs(1));
        cfg.max_concurrent_queries = 4;
        assert_eq!(cfg.grace, Duration::from_secs(1));
        assert_eq!(cfg.query_concurrency_limit(), Some(4));
    }
}
