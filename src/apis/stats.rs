/// Per-provider request statistics
///
/// Each provider owns one tracker; the manager and dashboards read
/// serializable snapshots via `get_stats()`.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct StatsInner {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    total_latency_ms: f64,
    last_error: Option<String>,
}

#[derive(Debug)]
pub struct ApiStatsTracker {
    inner: Mutex<StatsInner>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl Default for ApiStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiStatsTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatsInner::default()),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    pub async fn record_request(&self, success: bool, latency_ms: f64) {
        let mut inner = self.inner.lock().await;
        inner.total_requests += 1;
        inner.total_latency_ms += latency_ms;
        if success {
            inner.successful_requests += 1;
        } else {
            inner.failed_requests += 1;
        }
    }

    pub async fn record_error(&self, error: impl Into<String>) {
        self.inner.lock().await.last_error = Some(error.into());
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn get_stats(&self) -> ApiStats {
        let inner = self.inner.lock().await;
        let avg_latency_ms = if inner.total_requests > 0 {
            inner.total_latency_ms / inner.total_requests as f64
        } else {
            0.0
        };

        ApiStats {
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            avg_latency_ms,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            last_error: inner.last_error.clone(),
        }
    }
}

/// Serializable stats snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub avg_latency_ms: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_aggregates_requests_and_cache_counters() {
        let tracker = ApiStatsTracker::new();
        tracker.record_request(true, 10.0).await;
        tracker.record_request(false, 30.0).await;
        tracker.record_error("HTTP 500").await;
        tracker.record_cache_hit();
        tracker.record_cache_miss();
        tracker.record_cache_miss();

        let stats = tracker.get_stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert!((stats.avg_latency_ms - 20.0).abs() < f64::EPSILON);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 2);
        assert_eq!(stats.last_error.as_deref(), Some("HTTP 500"));
    }
}
