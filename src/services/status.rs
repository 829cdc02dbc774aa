/// Lifecycle status shared by every managed component
///
/// The only legal transitions are driven by `start()` and `stop()`:
///
/// ```text
/// Pending --start()--> Starting --ok--> Running --stop()--> Stopping --ok--> Stopped
/// ```
///
/// Any failure inside a transition lands the component in `Error`, which is
/// terminal until the caller explicitly retries `start()`.
use crate::errors::CoreError;
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Pending,
    Starting,
    Running,
    Stopping,
    Stopped,
    Error,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Pending => "pending",
            ServiceStatus::Starting => "starting",
            ServiceStatus::Running => "running",
            ServiceStatus::Stopping => "stopping",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interior-mutable status slot owned by each service instance
///
/// Transition methods enforce the state machine; illegal transitions fail
/// with `INVALID_STATE` and leave the current status untouched.
#[derive(Debug)]
pub struct StatusCell {
    status: RwLock<ServiceStatus>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(ServiceStatus::Pending),
        }
    }

    pub async fn get(&self) -> ServiceStatus {
        *self.status.read().await
    }

    /// `Pending | Stopped | Error -> Starting`
    pub async fn begin_start(&self, name: &str) -> Result<(), CoreError> {
        let mut status = self.status.write().await;
        match *status {
            ServiceStatus::Pending | ServiceStatus::Stopped | ServiceStatus::Error => {
                *status = ServiceStatus::Starting;
                Ok(())
            }
            current => Err(CoreError::invalid_state(name, current, "start")),
        }
    }

    /// `Running -> Stopping`
    pub async fn begin_stop(&self, name: &str) -> Result<(), CoreError> {
        let mut status = self.status.write().await;
        match *status {
            ServiceStatus::Running => {
                *status = ServiceStatus::Stopping;
                Ok(())
            }
            current => Err(CoreError::invalid_state(name, current, "stop")),
        }
    }

    pub async fn complete_start(&self) {
        *self.status.write().await = ServiceStatus::Running;
    }

    pub async fn complete_stop(&self) {
        *self.status.write().await = ServiceStatus::Stopped;
    }

    /// Record a failed transition; the caller re-raises the original error
    pub async fn fail(&self) {
        *self.status.write().await = ServiceStatus::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[tokio::test]
    async fn full_lifecycle_walks_the_state_machine() {
        let cell = StatusCell::new();
        assert_eq!(cell.get().await, ServiceStatus::Pending);

        cell.begin_start("svc").await.unwrap();
        assert_eq!(cell.get().await, ServiceStatus::Starting);
        cell.complete_start().await;
        assert_eq!(cell.get().await, ServiceStatus::Running);

        cell.begin_stop("svc").await.unwrap();
        assert_eq!(cell.get().await, ServiceStatus::Stopping);
        cell.complete_stop().await;
        assert_eq!(cell.get().await, ServiceStatus::Stopped);

        // Stopped services may be started again
        cell.begin_start("svc").await.unwrap();
        assert_eq!(cell.get().await, ServiceStatus::Starting);
    }

    #[tokio::test]
    async fn starting_a_running_service_fails_fast() {
        let cell = StatusCell::new();
        cell.begin_start("svc").await.unwrap();
        cell.complete_start().await;

        let err = cell.begin_start("svc").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);
        assert_eq!(cell.get().await, ServiceStatus::Running);
    }

    #[tokio::test]
    async fn stopping_a_pending_service_fails_fast() {
        let cell = StatusCell::new();
        let err = cell.begin_stop("svc").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);
        assert_eq!(cell.get().await, ServiceStatus::Pending);
    }

    #[tokio::test]
    async fn error_state_allows_start_retry() {
        let cell = StatusCell::new();
        cell.begin_start("svc").await.unwrap();
        cell.fail().await;
        assert_eq!(cell.get().await, ServiceStatus::Error);

        cell.begin_start("svc").await.unwrap();
        assert_eq!(cell.get().await, ServiceStatus::Starting);
    }
}
