/// Market-data provider framework and concrete API adapters
pub mod birdeye;
pub mod breaker;
pub mod cache;
pub mod client;
pub mod executor;
pub mod jupiter;
pub mod limits;
pub mod metaplex;
pub mod raydium;
pub mod stats;
pub mod types;
pub mod validate;

pub use birdeye::BirdeyeProvider;
pub use client::HttpClient;
pub use executor::OperationExecutor;
pub use jupiter::JupiterProvider;
pub use metaplex::MetaplexProvider;
pub use raydium::RaydiumProvider;
pub use stats::{ApiStats, ApiStatsTracker};
pub use types::{
    Candle, Creator, CreatorVerification, OrderBook, OrderBookLevel, PriceData, RiskFactor,
    Severity, Timeframe, TokenMetadata, TokenValidation,
};

use crate::errors::CoreError;
use crate::services::Service;
use async_trait::async_trait;
use serde::Serialize;

/// Operations a provider declares support for
///
/// Callers consult this before invoking an operation; unsupported
/// operations fail with `NOT_SUPPORTED`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProviderCapabilities {
    pub can_get_price: bool,
    pub can_get_ohlcv: bool,
    pub can_get_order_book: bool,
    pub can_get_metadata: bool,
    pub can_verify_creators: bool,
    pub can_validate_token: bool,
}

/// A managed service that additionally exposes market/metadata retrieval
/// against an external API
#[async_trait]
pub trait MarketDataProvider: Service {
    fn capabilities(&self) -> ProviderCapabilities;

    async fn get_price(&self, mint: &str) -> Result<PriceData, CoreError> {
        let _ = mint;
        Err(CoreError::not_supported(self.name(), "get_price"))
    }

    async fn get_order_book(
        &self,
        mint: &str,
        limit: Option<usize>,
    ) -> Result<OrderBook, CoreError> {
        let _ = (mint, limit);
        Err(CoreError::not_supported(self.name(), "get_order_book"))
    }

    async fn get_ohlcv(
        &self,
        mint: &str,
        timeframe: Timeframe,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, CoreError> {
        let _ = (mint, timeframe, limit);
        Err(CoreError::not_supported(self.name(), "get_ohlcv"))
    }

    async fn get_metadata(&self, mint: &str) -> Result<TokenMetadata, CoreError> {
        let _ = mint;
        Err(CoreError::not_supported(self.name(), "get_metadata"))
    }

    async fn verify_creator(&self, address: &str) -> Result<CreatorVerification, CoreError> {
        let _ = address;
        Err(CoreError::not_supported(self.name(), "verify_creator"))
    }

    async fn validate_token(&self, mint: &str) -> Result<TokenValidation, CoreError> {
        let _ = mint;
        Err(CoreError::not_supported(self.name(), "validate_token"))
    }
}
