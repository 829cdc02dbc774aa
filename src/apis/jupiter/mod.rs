/// Jupiter Price API provider
///
/// API Documentation: https://station.jup.ag/docs/apis/price-api-v2
///
/// Endpoints implemented:
/// 1. /price/v2?ids={mint} - Spot price (primary)
/// 2. /price/v2?ids={mint}&showExtraInfo=true - Price plus depth impact
///    ratios, used to derive an order book from routed liquidity
pub mod types;

use self::types::{JupiterImpactRatio, JupiterPriceEntry, JupiterPriceResponse};
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
// API CONFIGURATION - Hardcoded for Jupiter API
// ============================================================================

const JUPITER_BASE_URL: &str = "https://lite-api.jup.ag/price/v2";

/// Connectivity probe target: wrapped SOL always routes
const PROBE_MINT: &str = "So11111111111111111111111111111111111111112";

// ============================================================================
// PROVIDER IMPLEMENTATION
// ============================================================================

pub struct JupiterProvider {
    http: HttpClient,
    executor: OperationExecutor,
    status: Arc<StatusCell>,
    stats: Arc<ApiStatsTracker>,
    price_cache: ResponseCache<PriceData>,
}

impl JupiterProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, CoreError> {
        let status = Arc::new(StatusCell::new());
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            executor: OperationExecutor::new("jupiter", status.clone(), config),
            status,
            stats: Arc::new(ApiStatsTracker::new()),
            price_cache: ResponseCache::new(Duration::from_millis(config.price_cache_ttl_ms)),
        })
    }

    pub async fn get_stats(&self) -> crate::apis::ApiStats {
        self.stats.get_stats().await
    }

    async fn fetch_entry(
        &self,
        endpoint: &str,
        mint: &str,
        with_extra_info: bool,
    ) -> Result<JupiterPriceEntry, CoreError> {
        let url = if with_extra_info {
            format!("{}?ids={}&showExtraInfo=true", JUPITER_BASE_URL, mint)
        } else {
            format!("{}?ids={}", JUPITER_BASE_URL, mint)
        };

        let start = Instant::now();
        let response = self.http.client().get(&url).send().await;
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
                "jupiter",
                endpoint,
                format!("HTTP {}: {}", status, body),
            )
            .with_retryable(status.as_u16() == 429 || status.is_server_error()));
        }

        let parsed: JupiterPriceResponse = match response.json().await {
            Ok(value) => {
                self.stats.record_request(true, elapsed).await;
                value
            }
            Err(err) => {
                self.stats.record_request(false, elapsed).await;
                self.stats
                    .record_error(format!("{} parse error: {}", endpoint, err))
                    .await;
                return Err(CoreError::api_error(
                    "jupiter",
                    endpoint,
                    format!("failed to parse response: {}", err),
                ));
            }
        };

        parsed
            .data
            .get(mint)
            .and_then(|entry| entry.clone())
            .ok_or_else(|| CoreError::api_error("jupiter", endpoint, format!("no route for {}", mint)))
    }

    fn parse_price(entry: &JupiterPriceEntry, mint: &str) -> Result<f64, CoreError> {
        entry.price.parse().map_err(|_| {
            CoreError::api_error(
                "jupiter",
                "get_price",
                format!("unparseable price '{}' for {}", entry.price, mint),
            )
        })
    }

    /// Turn depth impact ratios into book levels
    ///
    /// Each (notional, impact) pair becomes one level: the executable price
    /// at that notional, sized as notional divided by price.
    fn levels_from_impact(
        price: f64,
        ratios: Option<&JupiterImpactRatio>,
        ask_side: bool,
        limit: usize,
    ) -> Vec<OrderBookLevel> {
        let mut pairs: Vec<(f64, f64)> = ratios
            .map(|r| {
                r.depth
                    .iter()
                    .filter_map(|(notional, impact)| {
                        notional.parse::<f64>().ok().map(|n| (n, *impact))
                    })
                    .collect()
            })
            .unwrap_or_default();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        pairs
            .into_iter()
            .take(limit)
            .map(|(notional, impact)| {
                let level_price = if ask_side {
                    price * (1.0 + impact)
                } else {
                    price * (1.0 - impact)
                };
                OrderBookLevel {
                    price: level_price,
                    size: if level_price > 0.0 {
                        notional / level_price
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }
}

#[async_trait]
impl Service for JupiterProvider {
    fn name(&self) -> &str {
        "jupiter"
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        logger::info(LogTag::Jupiter, "Probing Jupiter connectivity");
        self.fetch_entry("probe", PROBE_MINT, false).await?;
        logger::info(LogTag::Jupiter, "Jupiter provider ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CoreError> {
        self.executor.reset();
        self.price_cache.clear();
        logger::info(LogTag::Jupiter, "Jupiter provider stopped");
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for JupiterProvider {
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
            logger::debug(LogTag::Cache, &format!("jupiter price cache hit: {}", mint));
            return Ok(cached);
        }
        self.stats.record_cache_miss();
        logger::debug(LogTag::Cache, &format!("jupiter price cache miss: {}", mint));

        let price = self
            .executor
            .execute("get_price", || async {
                let entry = self.fetch_entry("get_price", mint, false).await?;
                Ok(PriceData {
                    mint: mint.to_string(),
                    price: Self::parse_price(&entry, mint)?,
                    liquidity: None,
                    updated_at: Utc::now(),
                    source: "jupiter".to_string(),
                })
            })
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
        let limit = limit.unwrap_or(usize::MAX);

        self.executor
            .execute("get_order_book", || async {
                let entry = self.fetch_entry("get_order_book", mint, true).await?;
                let price = Self::parse_price(&entry, mint)?;
                let depth = entry
                    .extra_info
                    .as_ref()
                    .and_then(|info| info.depth.as_ref());

                Ok(OrderBook {
                    mint: mint.to_string(),
                    bids: Self::levels_from_impact(
                        price,
                        depth.and_then(|d| d.sell_price_impact_ratio.as_ref()),
                        false,
                        limit,
                    ),
                    asks: Self::levels_from_impact(
                        price,
                        depth.and_then(|d| d.buy_price_impact_ratio.as_ref()),
                        true,
                        limit,
                    ),
                    updated_at: Utc::now(),
                    source: "jupiter".to_string(),
                })
            })
            .await
    }
}
