/// Structured error handling for the service lifecycle and provider core
///
/// Every failure surfaced to callers is a single `CoreError` carrying a
/// machine-readable code, a human-readable message, a retryability flag,
/// and optional structured details. Callers branch on `code()` and
/// `is_retryable()` rather than parsing messages.
use serde::Serialize;
use serde_json::Value;

// =============================================================================
// ERROR CODES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    // Lifecycle misuse (starting a running service, operating a stopped provider)
    InvalidState,

    // Registry / dependency graph errors
    DuplicateService,
    NotFound,
    MissingDependency,
    CircularDependency,

    // Transient guard rejections (retryable)
    RateLimitExceeded,
    CircuitBreakerOpen,

    // Operation interrupted by provider shutdown
    Cancelled,

    // Provider-level failures
    ValidationError,
    ApiError,
    NotSupported,

    // Aggregate stop_all failure
    ShutdownFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::DuplicateService => "DUPLICATE_SERVICE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MissingDependency => "MISSING_DEPENDENCY",
            ErrorCode::CircularDependency => "CIRCULAR_DEPENDENCY",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::CircuitBreakerOpen => "CIRCUIT_BREAKER_OPEN",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::NotSupported => "NOT_SUPPORTED",
            ErrorCode::ShutdownFailed => "SHUTDOWN_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug, Clone)]
pub struct CoreError {
    code: ErrorCode,
    message: String,
    retryable: bool,
    details: Option<Value>,
}

impl CoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let retryable = matches!(
            code,
            ErrorCode::RateLimitExceeded | ErrorCode::CircuitBreakerOpen
        );
        Self {
            code,
            message: message.into(),
            retryable,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for CoreError {}

// =============================================================================
// STRUCTURED ERROR BUILDERS
// =============================================================================

impl CoreError {
    /// Lifecycle misuse: wrong status for the attempted transition/operation
    pub fn invalid_state(name: &str, current: impl std::fmt::Display, attempted: &str) -> Self {
        CoreError::new(
            ErrorCode::InvalidState,
            format!("{}: cannot {} while {}", name, attempted, current),
        )
        .with_details(serde_json::json!({
            "service": name,
            "status": current.to_string(),
            "attempted": attempted,
        }))
    }

    pub fn duplicate_service(name: &str) -> Self {
        CoreError::new(
            ErrorCode::DuplicateService,
            format!("Service already registered: {}", name),
        )
    }

    pub fn not_found(name: &str) -> Self {
        CoreError::new(ErrorCode::NotFound, format!("Service not found: {}", name))
    }

    pub fn missing_dependency(service: &str, dependency: &str) -> Self {
        CoreError::new(
            ErrorCode::MissingDependency,
            format!(
                "Service {} depends on unregistered service {}",
                service, dependency
            ),
        )
        .with_details(serde_json::json!({
            "service": service,
            "dependency": dependency,
        }))
    }

    pub fn circular_dependency(name: &str) -> Self {
        CoreError::new(
            ErrorCode::CircularDependency,
            format!("Circular dependency detected at service: {}", name),
        )
    }

    /// Per-endpoint window quota exhausted; safe to retry once the window rolls over
    pub fn rate_limited(endpoint: &str, retry_in_ms: u64) -> Self {
        CoreError::new(
            ErrorCode::RateLimitExceeded,
            format!("Rate limit exceeded for {}", endpoint),
        )
        .with_details(serde_json::json!({
            "endpoint": endpoint,
            "retry_in_ms": retry_in_ms,
        }))
    }

    /// Breaker open after repeated failures; safe to retry once the cool-down elapses
    pub fn breaker_open(endpoint: &str, retry_in_ms: u64) -> Self {
        CoreError::new(
            ErrorCode::CircuitBreakerOpen,
            format!("Circuit breaker open for {}", endpoint),
        )
        .with_details(serde_json::json!({
            "endpoint": endpoint,
            "retry_in_ms": retry_in_ms,
        }))
    }

    pub fn cancelled(endpoint: &str) -> Self {
        CoreError::new(
            ErrorCode::Cancelled,
            format!("Operation cancelled by shutdown: {}", endpoint),
        )
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        CoreError::new(
            ErrorCode::ValidationError,
            format!("Invalid {}: {}", field, reason),
        )
        .with_details(serde_json::json!({
            "field": field,
            "reason": reason,
        }))
    }

    pub fn api_error(provider: &str, endpoint: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        CoreError::new(
            ErrorCode::ApiError,
            format!("{} {}: {}", provider, endpoint, message),
        )
        .with_details(serde_json::json!({
            "provider": provider,
            "endpoint": endpoint,
        }))
    }

    pub fn not_supported(provider: &str, operation: &str) -> Self {
        CoreError::new(
            ErrorCode::NotSupported,
            format!("{} does not support {}", provider, operation),
        )
    }

    pub fn shutdown_failed(failed: &[(String, String)]) -> Self {
        let names: Vec<&str> = failed.iter().map(|(name, _)| name.as_str()).collect();
        CoreError::new(
            ErrorCode::ShutdownFailed,
            format!("{} service(s) failed to stop: {}", failed.len(), names.join(", ")),
        )
        .with_details(serde_json::json!({
            "failures": failed
                .iter()
                .map(|(name, error)| serde_json::json!({ "service": name, "error": error }))
                .collect::<Vec<_>>(),
        }))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures are worth retrying; the upstream may recover
        CoreError::new(ErrorCode::ApiError, format!("HTTP request failed: {}", err))
            .with_retryable(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes_are_retryable_by_default() {
        assert!(CoreError::rate_limited("get_price", 250).is_retryable());
        assert!(CoreError::breaker_open("get_price", 30_000).is_retryable());
        assert!(!CoreError::not_found("birdeye").is_retryable());
        assert!(!CoreError::validation("mint", "too short").is_retryable());
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = CoreError::duplicate_service("logger");
        let rendered = err.to_string();
        assert!(rendered.contains("DUPLICATE_SERVICE"));
        assert!(rendered.contains("logger"));
    }

    #[test]
    fn details_carry_structured_context() {
        let err = CoreError::rate_limited("get_ohlcv", 750);
        let details = err.details().expect("details present");
        assert_eq!(details["endpoint"], "get_ohlcv");
        assert_eq!(details["retry_in_ms"], 750);
    }
}
