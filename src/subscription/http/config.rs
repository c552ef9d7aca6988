use std::time::Duration;

use super::retry::RetryPolicy;

/// Configuration for query behavior.
///
/// This controls how queries cache data, when they consider it stale, and how
/// failed fetches are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long data is considered fresh before becoming stale.
    ///
    /// When data is fresh, queries will use cached data without refetching.
    /// Once stale, queries will refetch in the background while still showing cached data.
    pub stale_time: Duration,

    /// How long cached data is retained before being garbage collected.
    ///
    /// Entries without subscribers that haven't been accessed for this
    /// duration are removed by [`QueryClient::collect_garbage`](super::QueryClient::collect_garbage).
    pub cache_time: Duration,

    /// Retry policy applied to queries that don't set their own.
    pub retry: RetryPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(0),      // immediately stale
            cache_time: Duration::from_secs(5 * 60), // 5 minutes
            retry: RetryPolicy::DEFAULT,
        }
    }
}

impl QueryConfig {
    /// Creates a new query configuration with the given stale and cache times.
    #[must_use]
    pub const fn new(stale_time: Duration, cache_time: Duration) -> Self {
        Self {
            stale_time,
            cache_time,
            retry: RetryPolicy::DEFAULT,
        }
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.stale_time, Duration::from_secs(0));
        assert_eq!(config.cache_time, Duration::from_secs(5 * 60));
        assert_eq!(config.retry, RetryPolicy::DEFAULT);
    }

    #[test]
    fn test_new_config() {
        let config = QueryConfig::new(Duration::from_secs(30), Duration::from_secs(300));
        assert_eq!(config.stale_time, Duration::from_secs(30));
        assert_eq!(config.cache_time, Duration::from_secs(300));
    }

    #[test]
    fn test_with_retry() {
        let config = QueryConfig::default().with_retry(RetryPolicy::NONE);
        assert_eq!(config.retry.max_retries, 0);
    }
}
