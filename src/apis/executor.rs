/// Resilient operation executor
///
/// Providers route every outbound call through `execute(endpoint, op)`,
/// which layers the cross-cutting reliability controls around a plain
/// async closure:
///
/// 1. status gate (owning service must be running)
/// 2. fixed-window rate limit per endpoint
/// 3. circuit breaker per endpoint
/// 4. the call itself, raced against the shutdown signal
/// 5. breaker bookkeeping from the call's outcome
///
/// Guard rejections happen before any network I/O is attempted.
use crate::apis::breaker::BreakerMap;
use crate::apis::limits::RateLimitWindows;
use crate::config::ProviderConfig;
use crate::errors::{CoreError, ErrorCode};
use crate::logger::{self, LogTag};
use crate::services::{ServiceStatus, StatusCell};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug)]
pub struct OperationExecutor {
    provider: String,
    status: Arc<StatusCell>,
    limits: RateLimitWindows,
    breakers: BreakerMap,
    shutdown: Notify,
}

impl OperationExecutor {
    pub fn new(provider: impl Into<String>, status: Arc<StatusCell>, config: &ProviderConfig) -> Self {
        Self {
            provider: provider.into(),
            status,
            limits: RateLimitWindows::new(
                Duration::from_millis(config.rate_limit_ms),
                config.max_requests_per_window,
            ),
            breakers: BreakerMap::new(
                config.circuit_breaker_threshold,
                Duration::from_millis(config.circuit_breaker_cooldown_ms),
            ),
            shutdown: Notify::new(),
        }
    }

    pub async fn execute<T, F, Fut>(&self, endpoint: &str, op: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let status = self.status.get().await;
        if status != ServiceStatus::Running {
            return Err(CoreError::invalid_state(&self.provider, status, endpoint));
        }

        self.limits.check(endpoint)?;
        self.breakers.check(endpoint)?;

        let result = tokio::select! {
            // Register the shutdown waiter before the operation is first polled
            biased;
            _ = self.shutdown.notified() => {
                return Err(CoreError::cancelled(endpoint));
            }
            result = op() => result,
        };

        match &result {
            Ok(_) => self.breakers.record_success(endpoint),
            Err(e) if e.code() == ErrorCode::Cancelled => {}
            Err(e) => {
                if self.breakers.record_failure(endpoint) {
                    logger::warning(
                        LogTag::Api,
                        &format!(
                            "{}: circuit breaker opened for {} after repeated failures: {}",
                            self.provider, endpoint, e
                        ),
                    );
                }
            }
        }

        result
    }

    /// Cancel in-flight operations and drop all per-endpoint state
    ///
    /// Called from provider shutdown so a restarted instance begins clean.
    pub fn reset(&self) {
        self.shutdown.notify_waiters();
        self.limits.clear();
        self.breakers.clear();
    }
}
