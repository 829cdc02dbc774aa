/// Fixed-window rate limiting keyed by endpoint name
///
/// Window state is created lazily on the first call to an endpoint and
/// reset once the window elapses. A rejected call costs no quota and no
/// network I/O.
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    request_count: u32,
}

#[derive(Debug)]
pub struct RateLimitWindows {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, WindowState>>,
}

impl RateLimitWindows {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Charge one request against the endpoint's current window
    pub fn check(&self, endpoint: &str) -> Result<(), CoreError> {
        self.check_at(endpoint, Instant::now())
    }

    /// Deterministic entry point used by `check` and by tests
    pub fn check_at(&self, endpoint: &str, now: Instant) -> Result<(), CoreError> {
        let mut windows = self.windows.lock().unwrap();
        let state = windows.entry(endpoint.to_string()).or_insert(WindowState {
            window_start: now,
            request_count: 0,
        });

        if now.duration_since(state.window_start) >= self.window {
            state.window_start = now;
            state.request_count = 0;
        }

        if state.request_count >= self.max_requests {
            let elapsed = now.duration_since(state.window_start);
            let retry_in = self.window.saturating_sub(elapsed);
            return Err(CoreError::rate_limited(endpoint, retry_in.as_millis() as u64));
        }

        state.request_count += 1;
        Ok(())
    }

    /// Drop all window state (provider stop)
    pub fn clear(&self) {
        self.windows.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn quota_is_enforced_within_a_window() {
        let limits = RateLimitWindows::new(Duration::from_millis(1000), 5);
        let now = Instant::now();

        for _ in 0..5 {
            limits.check_at("get_price", now).unwrap();
        }

        let err = limits.check_at("get_price", now).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RateLimitExceeded);
        assert!(err.is_retryable());
    }

    #[test]
    fn window_rollover_resets_the_quota() {
        let limits = RateLimitWindows::new(Duration::from_millis(1000), 2);
        let start = Instant::now();

        limits.check_at("get_price", start).unwrap();
        limits.check_at("get_price", start).unwrap();
        assert!(limits.check_at("get_price", start).is_err());

        let next_window = start + Duration::from_millis(1000);
        limits.check_at("get_price", next_window).unwrap();
    }

    #[test]
    fn endpoints_are_limited_independently() {
        let limits = RateLimitWindows::new(Duration::from_millis(1000), 1);
        let now = Instant::now();

        limits.check_at("get_price", now).unwrap();
        assert!(limits.check_at("get_price", now).is_err());
        limits.check_at("get_ohlcv", now).unwrap();
    }

    #[test]
    fn rejection_details_carry_the_retry_hint() {
        let limits = RateLimitWindows::new(Duration::from_millis(1000), 1);
        let start = Instant::now();

        limits.check_at("get_price", start).unwrap();
        let err = limits
            .check_at("get_price", start + Duration::from_millis(400))
            .unwrap_err();

        let retry_in = err.details().unwrap()["retry_in_ms"].as_u64().unwrap();
        assert_eq!(retry_in, 600);
    }

    #[test]
    fn clear_resets_every_endpoint() {
        let limits = RateLimitWindows::new(Duration::from_millis(1000), 1);
        let now = Instant::now();

        limits.check_at("get_price", now).unwrap();
        assert!(limits.check_at("get_price", now).is_err());

        limits.clear();
        limits.check_at("get_price", now).unwrap();
    }
}
