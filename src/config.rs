use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reliability settings shared by every provider instance
///
/// All fields are optional in config files and fall back to the defaults
/// documented on each field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Fixed rate-limit window length in milliseconds (default 1000)
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Maximum requests allowed per window per endpoint (default 10)
    #[serde(default = "default_max_requests")]
    pub max_requests_per_window: u32,
    /// Reserved for token-bucket burst tolerance (default 2, currently unused
    /// by the fixed-window limiter)
    #[serde(default = "default_burst_limit")]
    pub burst_limit: u32,
    /// Consecutive failures before the circuit breaker opens (default 5)
    #[serde(default = "default_breaker_threshold")]
    pub circuit_breaker_threshold: u32,
    /// Breaker cool-down before a half-open probe is allowed (default 30s)
    #[serde(default = "default_breaker_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
    /// TTL for cached price lookups (default 5s)
    #[serde(default = "default_price_ttl_ms")]
    pub price_cache_ttl_ms: u64,
    /// TTL for cached metadata/creator lookups (default 30min)
    #[serde(default = "default_metadata_ttl_ms")]
    pub metadata_cache_ttl_ms: u64,
    /// Outbound HTTP timeout in seconds (default 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rate_limit_ms() -> u64 {
    1000
}
fn default_max_requests() -> u32 {
    10
}
fn default_burst_limit() -> u32 {
    2
}
fn default_breaker_threshold() -> u32 {
    5
}
fn default_breaker_cooldown_ms() -> u64 {
    30_000
}
fn default_price_ttl_ms() -> u64 {
    5_000
}
fn default_metadata_ttl_ms() -> u64 {
    1_800_000 // 30 minutes
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit_ms(),
            max_requests_per_window: default_max_requests(),
            burst_limit: default_burst_limit(),
            circuit_breaker_threshold: default_breaker_threshold(),
            circuit_breaker_cooldown_ms: default_breaker_cooldown_ms(),
            price_cache_ttl_ms: default_price_ttl_ms(),
            metadata_cache_ttl_ms: default_metadata_ttl_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Per-provider settings block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key for key-authenticated providers (Birdeye)
    #[serde(default)]
    pub api_key: String,
    /// RPC endpoint override for RPC-backed providers (Metaplex)
    #[serde(default)]
    pub rpc_url: String,
    #[serde(flatten)]
    pub limits: ProviderConfig,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            rpc_url: String::new(),
            limits: ProviderConfig::default(),
        }
    }
}

/// Root configuration for the orchestration core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub birdeye: ProviderSettings,
    #[serde(default)]
    pub raydium: ProviderSettings,
    #[serde(default)]
    pub jupiter: ProviderSettings,
    #[serde(default)]
    pub metaplex: ProviderSettings,
}

/// Load configuration from a JSON file, falling back to defaults for
/// any missing field
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: CoreConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProviderConfig::default();
        assert_eq!(config.rate_limit_ms, 1000);
        assert_eq!(config.max_requests_per_window, 10);
        assert_eq!(config.burst_limit, 2);
        assert_eq!(config.circuit_breaker_threshold, 5);
        assert_eq!(config.circuit_breaker_cooldown_ms, 30_000);
        assert_eq!(config.price_cache_ttl_ms, 5_000);
        assert_eq!(config.metadata_cache_ttl_ms, 1_800_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CoreConfig = serde_json::from_str(
            r#"{ "birdeye": { "api_key": "0123456789abcdef", "max_requests_per_window": 3 } }"#,
        )
        .expect("parse");
        assert_eq!(config.birdeye.api_key, "0123456789abcdef");
        assert_eq!(config.birdeye.limits.max_requests_per_window, 3);
        assert_eq!(config.birdeye.limits.rate_limit_ms, 1000);
        assert!(config.raydium.enabled);
    }
}
