/// Global logger configuration
///
/// Holds the minimum level threshold. Defaults to Info; tests and
/// embedding applications can lower or raise it at any time.
use super::levels::LogLevel;
use once_cell::sync::Lazy;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

/// Set the minimum level shown on the console
pub fn set_min_level(level: LogLevel) {
    if let Ok(mut config) = LOGGER_CONFIG.write() {
        config.min_level = level;
    }
}
