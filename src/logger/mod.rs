//! Structured console logging for the provider orchestration core
//!
//! Provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug)
//! - Per-area tags for filtering and scanning output
//! - Colored console output with aligned prefixes
//!
//! ## Usage
//!
//! ```rust
//! use pulsebot::logger::{self, LogTag};
//!
//! logger::info(LogTag::Services, "Service started: birdeye");
//! logger::warning(LogTag::Api, "Rate limit approaching");
//! ```

mod config;
mod core;
mod levels;
mod tags;

pub use config::{set_min_level, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues that need attention)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operational messages)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics, hidden by default)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}
