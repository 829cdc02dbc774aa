/// Raydium V3 API provider
///
/// API Documentation: https://api-v3.raydium.io/docs
///
/// Endpoints implemented:
/// 1. /mint/price - Spot price per mint (primary)
/// 2. /pools/info/mint - Deepest pool for a mint, used for order-book synthesis
/// 3. /main/version - Connectivity probe
///
/// Raydium is an AMM, so there is no real order book; depth levels are
/// synthesized by stepping around the pool price with sizes taken from the
/// pool reserves.
pub mod types;

use self::types::{RaydiumPool, RaydiumPoolsResponse, RaydiumPriceResponse, RaydiumVersionResponse};
use crate::apis::cache::ResponseCache;
use crate::apis::client::HttpClient;
use crate::apis::executor::OperationExecutor;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::validate::validate_mint;
use crate::apis::{
    MarketDataProvider, OrderBook, OrderBookLevel, PriceData, ProviderCapabilities,
};
use crate::config::ProviderConfig;
use crate::errors::CoreError;
use crate::logger::{self, LogTag};
use crate::services::{Service, StatusCell};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// API CONFIGURATION - Hardcoded for Raydium V3 API
// ============================================================================

const RAYDIUM_BASE_URL: &str = "https://api-v3.raydium.io";

/// Price step between synthesized depth levels (0.5%)
const BOOK_LEVEL_STEP: f64 = 0.005;

/// Fraction of the pool reserve attributed to each synthesized level
const BOOK_LEVEL_RESERVE_FRACTION: f64 = 0.01;

/// Default number of levels per book side
const DEFAULT_BOOK_DEPTH: usize = 10;

// ============================================================================
// PROVIDER IMPLEMENTATION
// ============================================================================

pub struct RaydiumProvider {
    http: HttpClient,
    executor: OperationExecutor,
    status: Arc<StatusCell>,
    stats: Arc<ApiStatsTracker>,
    price_cache: ResponseCache<PriceData>,
}

impl RaydiumProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, CoreError> {
        let status = Arc::new(StatusCell::new());
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            executor: OperationExecutor::new("raydium", status.clone(), config),
            status,
            stats: Arc::new(ApiStatsTracker::new()),
            price_cache: ResponseCache::new(Duration::from_millis(config.price_cache_ttl_ms)),
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
        let response = self.http.client().get(url).send().await;
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
                "raydium",
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
                    "raydium",
                    endpoint,
                    format!("failed to parse response: {}", err),
                ))
            }
        }
    }

    async fn fetch_price(&self, mint: &str) -> Result<PriceData, CoreError> {
        let url = format!("{}/mint/price?mints={}", RAYDIUM_BASE_URL, mint);
        let response: RaydiumPriceResponse = self.get_json("get_price", &url).await?;

        if !response.success {
            return Err(CoreError::api_error(
                "raydium",
                "get_price",
                "upstream reported failure",
            ));
        }

        let raw = response
            .data
            .get(mint)
            .and_then(|p| p.as_deref())
            .ok_or_else(|| {
                CoreError::api_error("raydium", "get_price", format!("no price for {}", mint))
            })?;

        let price: f64 = raw.parse().map_err(|_| {
            CoreError::api_error(
                "raydium",
                "get_price",
                format!("unparseable price '{}' for {}", raw, mint),
            )
        })?;

        Ok(PriceData {
            mint: mint.to_string(),
            price,
            liquidity: None,
            updated_at: Utc::now(),
            source: "raydium".to_string(),
        })
    }

    async fn fetch_deepest_pool(&self, mint: &str) -> Result<RaydiumPool, CoreError> {
        let url = format!(
            "{}/pools/info/mint?mint1={}&poolType=all&poolSortField=liquidity&sortType=desc&pageSize=1&page=1",
            RAYDIUM_BASE_URL, mint
        );
        let response: RaydiumPoolsResponse = self.get_json("get_order_book", &url).await?;

        response
            .data
            .filter(|_| response.success)
            .and_then(|page| page.data.into_iter().next())
            .ok_or_else(|| {
                CoreError::api_error("raydium", "get_order_book", format!("no pool for {}", mint))
            })
    }

    /// Step depth levels around the pool price, sized from the reserves
    fn synthesize_book(mint: &str, pool: &RaydiumPool, depth: usize) -> OrderBook {
        let mut bids = Vec::with_capacity(depth);
        let mut asks = Vec::with_capacity(depth);

        for i in 1..=depth {
            let offset = BOOK_LEVEL_STEP * i as f64;
            let size = pool.mint_amount_a * BOOK_LEVEL_RESERVE_FRACTION;
            bids.push(OrderBookLevel {
                price: pool.price * (1.0 - offset),
                size,
            });
            asks.push(OrderBookLevel {
                price: pool.price * (1.0 + offset),
                size,
            });
        }

        OrderBook {
            mint: mint.to_string(),
            bids,
            asks,
            updated_at: Utc::now(),
            source: "raydium".to_string(),
        }
    }

    async fn probe(&self) -> Result<(), CoreError> {
        let url = format!("{}/main/version", RAYDIUM_BASE_URL);
        let response: RaydiumVersionResponse = self.get_json("probe", &url).await?;
        if !response.success {
            return Err(CoreError::api_error("raydium", "probe", "version check failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl Service for RaydiumProvider {
    fn name(&self) -> &str {
        "raydium"
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        logger::info(LogTag::Raydium, "Probing Raydium connectivity");
        self.probe().await?;
        logger::info(LogTag::Raydium, "Raydium provider ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CoreError> {
        self.executor.reset();
        self.price_cache.clear();
        logger::info(LogTag::Raydium, "Raydium provider stopped");
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for RaydiumProvider {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            can_get_price: true,
            can_get_order_book: true,
            ..ProviderCapabilities::default()
        }
    }

    async fn get_price(&self, mint: &str) -> Result<PriceData, CoreError> {
        validate_mint(mint)?;

        if let Some(cached) = self.price_cache.get(mint) {
            self.stats.record_cache_hit();
            logger::debug(LogTag::Cache, &format!("raydium price cache hit: {}", mint));
            return Ok(cached);
        }
        self.stats.record_cache_miss();
        logger::debug(LogTag::Cache, &format!("raydium price cache miss: {}", mint));

        let price = self
            .executor
            .execute("get_price", || self.fetch_price(mint))
            .await?;
        self.price_cache.insert(mint, price.clone());
        Ok(price)
    }

    async fn get_order_book(
        &self,
        mint: &str,
        limit: Option<usize>,
    ) -> Result<OrderBook, CoreError> {
        validate_mint(mint)?;
        let depth = limit.unwrap_or(DEFAULT_BOOK_DEPTH);

        let pool = self
            .executor
            .execute("get_order_book", || self.fetch_deepest_pool(mint))
            .await?;
        Ok(Self::synthesize_book(mint, &pool, depth))
    }
}
