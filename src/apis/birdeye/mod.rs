/// Birdeye API provider
///
/// API Documentation: https://docs.birdeye.so/
///
/// Endpoints implemented:
/// 1. /defi/price - Spot price for a token mint (primary)
/// 2. /defi/ohlcv - OHLCV candles per timeframe
pub mod types;

use self::types::{BirdeyeOhlcvResponse, BirdeyePriceResponse};
use crate::apis::cache::ResponseCache;
use crate::apis::client::HttpClient;
use crate::apis::executor::OperationExecutor;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::validate::{validate_api_key, validate_mint};
use crate::apis::{Candle, MarketDataProvider, PriceData, ProviderCapabilities, Timeframe};
use crate::config::ProviderConfig;
use crate::errors::CoreError;
use crate::logger::{self, LogTag};
use crate::services::{Service, StatusCell};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// API CONFIGURATION - Hardcoded for Birdeye API
// ============================================================================

const BIRDEYE_BASE_URL: &str = "https://public-api.birdeye.so";

/// Connectivity probe target: wrapped SOL always exists
const PROBE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Default candle count when the caller passes no limit
const DEFAULT_OHLCV_LIMIT: usize = 100;

// ============================================================================
// PROVIDER IMPLEMENTATION
// ============================================================================

#[derive(Debug)]
pub struct BirdeyeProvider {
    http: HttpClient,
    executor: OperationExecutor,
    status: Arc<StatusCell>,
    stats: Arc<ApiStatsTracker>,
    price_cache: ResponseCache<PriceData>,
    api_key: String,
}

impl BirdeyeProvider {
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Result<Self, CoreError> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;

        let status = Arc::new(StatusCell::new());
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            executor: OperationExecutor::new("birdeye", status.clone(), config),
            status,
            stats: Arc::new(ApiStatsTracker::new()),
            price_cache: ResponseCache::new(Duration::from_millis(config.price_cache_ttl_ms)),
            api_key,
        })
    }

    pub async fn get_stats(&self) -> crate::apis::ApiStats {
        self.stats.get_stats().await
    }

    async fn get_json<T>(&self, endpoint: &str, url: &str) -> Result<T, CoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let start = Instant::now();
        let response = self
            .http
            .client()
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .header("x-chain", "solana")
            .send()
            .await;
        let elapsed = start.elapsed().as_millis() as f64;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.stats.record_request(false, elapsed).await;
                self.stats
                    .record_error(format!("{} request failed: {}", endpoint, err))
                    .await;
                return Err(err.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.stats.record_request(false, elapsed).await;
            let body = response.text().await.unwrap_or_default();
            self.stats
                .record_error(format!("{} HTTP {}: {}", endpoint, status, body))
                .await;
            return Err(CoreError::api_error(
                "birdeye",
                endpoint,
                format!("HTTP {}: {}", status, body),
            )
            .with_retryable(status.as_u16() == 429 || status.is_server_error()));
        }

        match response.json::<T>().await {
            Ok(value) => {
                self.stats.record_request(true, elapsed).await;
                Ok(value)
            }
            Err(err) => {
                self.stats.record_request(false, elapsed).await;
                self.stats
                    .record_error(format!("{} parse error: {}", endpoint, err))
                    .await;
                Err(CoreError::api_error(
                    "birdeye",
                    endpoint,
                    format!("failed to parse response: {}", err),
                ))
            }
        }
    }

    async fn fetch_price(&self, mint: &str) -> Result<PriceData, CoreError> {
        let url = format!("{}/defi/price?address={}", BIRDEYE_BASE_URL, mint);
        let response: BirdeyePriceResponse = self.get_json("get_price", &url).await?;

        let data = response
            .data
            .filter(|_| response.success)
            .ok_or_else(|| {
                CoreError::api_error("birdeye", "get_price", format!("no price for {}", mint))
            })?;

        let updated_at = data
            .update_unix_time
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Ok(PriceData {
            mint: mint.to_string(),
            price: data.value,
            liquidity: data.liquidity,
            updated_at,
            source: "birdeye".to_string(),
        })
    }

    async fn fetch_ohlcv(
        &self,
        mint: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, CoreError> {
        let time_to = Utc::now().timestamp();
        let time_from = time_to - (timeframe.seconds() as i64) * limit as i64;
        let url = format!(
            "{}/defi/ohlcv?address={}&type={}&time_from={}&time_to={}",
            BIRDEYE_BASE_URL,
            mint,
            timeframe.as_str(),
            time_from,
            time_to
        );

        let response: BirdeyeOhlcvResponse = self.get_json("get_ohlcv", &url).await?;
        let data = response
            .data
            .filter(|_| response.success)
            .ok_or_else(|| {
                CoreError::api_error("birdeye", "get_ohlcv", format!("no candles for {}", mint))
            })?;

        let candles = data
            .items
            .into_iter()
            .filter_map(|item| {
                DateTime::<Utc>::from_timestamp(item.unix_time, 0).map(|open_time| Candle {
                    open_time,
                    open: item.o,
                    high: item.h,
                    low: item.l,
                    close: item.c,
                    volume: item.v,
                })
            })
            .take(limit)
            .collect();

        Ok(candles)
    }
}

#[async_trait]
impl Service for BirdeyeProvider {
    fn name(&self) -> &str {
        "birdeye"
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        logger::info(LogTag::Birdeye, "Probing Birdeye connectivity");
        self.fetch_price(PROBE_MINT).await?;
        logger::info(LogTag::Birdeye, "Birdeye provider ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CoreError> {
        self.executor.reset();
        self.price_cache.clear();
        logger::info(LogTag::Birdeye, "Birdeye provider stopped");
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for BirdeyeProvider {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            can_get_price: true,
            can_get_ohlcv: true,
            ..ProviderCapabilities::default()
        }
    }

    async fn get_price(&self, mint: &str) -> Result<PriceData, CoreError> {
        validate_mint(mint)?;

        if let Some(cached) = self.price_cache.get(mint) {
            self.stats.record_cache_hit();
            logger::debug(LogTag::Cache, &format!("birdeye price cache hit: {}", mint));
            return Ok(cached);
        }
        self.stats.record_cache_miss();
        logger::debug(LogTag::Cache, &format!("birdeye price cache miss: {}", mint));

        let price = self
            .executor
            .execute("get_price", || self.fetch_price(mint))
            .await?;
        self.price_cache.insert(mint, price.clone());
        Ok(price)
    }

    async fn get_ohlcv(
        &self,
        mint: &str,
        timeframe: Timeframe,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, CoreError> {
        validate_mint(mint)?;
        let limit = limit.unwrap_or(DEFAULT_OHLCV_LIMIT);

        self.executor
            .execute("get_ohlcv", || self.fetch_ohlcv(mint, timeframe, limit))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn provider() -> BirdeyeProvider {
        BirdeyeProvider::new("0123456789abcdef", &ProviderConfig::default()).unwrap()
    }

    #[test]
    fn construction_rejects_short_api_keys() {
        let err = BirdeyeProvider::new("short", &ProviderConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn invalid_mint_fails_before_any_io() {
        let provider = provider();
        let err = provider.get_price("not-a-mint").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn operations_require_running_status() {
        let provider = provider();
        let err = provider
            .get_price("So11111111111111111111111111111111111111112")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn capabilities_exclude_metadata_operations() {
        let provider = provider();
        let caps = provider.capabilities();
        assert!(caps.can_get_price);
        assert!(caps.can_get_ohlcv);
        assert!(!caps.can_get_metadata);

        let err = provider
            .get_metadata("So11111111111111111111111111111111111111112")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotSupported);
    }
}
