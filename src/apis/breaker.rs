/// Per-endpoint circuit breakers
///
/// A breaker opens after a configured number of consecutive failures and
/// rejects calls until the cool-down elapses. The first call after the
/// cool-down is a half-open probe: it is let through, and its outcome
/// either closes the breaker or re-opens it for another cool-down.
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct BreakerState {
    failures: u32,
    last_failure: Option<Instant>,
    is_open: bool,
    next_retry: Option<Instant>,
}

#[derive(Debug)]
pub struct BreakerMap {
    threshold: u32,
    cooldown: Duration,
    breakers: Mutex<HashMap<String, BreakerState>>,
}

impl BreakerMap {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, endpoint: &str) -> Result<(), CoreError> {
        self.check_at(endpoint, Instant::now())
    }

    /// Reject while open and cooling down; allow a half-open probe afterwards
    pub fn check_at(&self, endpoint: &str, now: Instant) -> Result<(), CoreError> {
        let breakers = self.breakers.lock().unwrap();
        let state = match breakers.get(endpoint) {
            Some(state) if state.is_open => state,
            _ => return Ok(()),
        };

        match state.next_retry {
            Some(next_retry) if now < next_retry => {
                let retry_in = next_retry.duration_since(now);
                Err(CoreError::breaker_open(endpoint, retry_in.as_millis() as u64))
            }
            // Cool-down elapsed: let the probe through, breaker stays open
            // until the probe result is recorded
            _ => Ok(()),
        }
    }

    /// A successful call closes the breaker and zeroes the failure count
    pub fn record_success(&self, endpoint: &str) {
        let mut breakers = self.breakers.lock().unwrap();
        if let Some(state) = breakers.get_mut(endpoint) {
            state.failures = 0;
            state.is_open = false;
            state.next_retry = None;
        }
    }

    pub fn record_failure(&self, endpoint: &str) -> bool {
        self.record_failure_at(endpoint, Instant::now())
    }

    /// Count a failure; returns true if this failure opened the breaker
    pub fn record_failure_at(&self, endpoint: &str, now: Instant) -> bool {
        let mut breakers = self.breakers.lock().unwrap();
        let state = breakers.entry(endpoint.to_string()).or_default();

        state.failures += 1;
        state.last_failure = Some(now);

        if state.failures >= self.threshold {
            let newly_opened = !state.is_open;
            state.is_open = true;
            state.next_retry = Some(now + self.cooldown);
            newly_opened
        } else {
            false
        }
    }

    /// Drop all breaker state (provider stop)
    pub fn clear(&self) {
        self.breakers.lock().unwrap().clear();
    }
}
