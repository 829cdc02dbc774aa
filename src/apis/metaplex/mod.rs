/// Metaplex DAS provider for token metadata and risk assessment
///
/// Talks JSON-RPC to a DAS-enabled Solana RPC endpoint.
///
/// Methods implemented:
/// 1. getAsset - On-chain metadata for a mint (primary)
/// 2. getAssetsByCreator - Creator history for background checks
/// 3. getHealth - Connectivity probe
pub mod risk;
pub mod types;

use self::types::{DasAsset, DasAssetList, RpcResponse};
use crate::apis::cache::ResponseCache;
use crate::apis::client::HttpClient;
use crate::apis::executor::OperationExecutor;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::validate::validate_mint;
use crate::apis::{
    Creator, CreatorVerification, MarketDataProvider, ProviderCapabilities, TokenMetadata,
    TokenValidation,
};
use crate::config::ProviderConfig;
use crate::errors::CoreError;
use crate::logger::{self, LogTag};
use crate::services::{Service, StatusCell};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// API CONFIGURATION
// ============================================================================

const DEFAULT_RPC_URL: &str = "https://mainnet.helius-rpc.com";

/// Creator history page size for background checks
const CREATOR_HISTORY_LIMIT: u32 = 50;

// ============================================================================
// PROVIDER IMPLEMENTATION
// ============================================================================

pub struct MetaplexProvider {
    http: HttpClient,
    executor: OperationExecutor,
    status: Arc<StatusCell>,
    stats: Arc<ApiStatsTracker>,
    metadata_cache: ResponseCache<TokenMetadata>,
    creator_cache: ResponseCache<CreatorVerification>,
    rpc_url: String,
}

impl MetaplexProvider {
    pub fn new(rpc_url: impl Into<String>, config: &ProviderConfig) -> Result<Self, CoreError> {
        let rpc_url = rpc_url.into();
        let rpc_url = if rpc_url.is_empty() {
            DEFAULT_RPC_URL.to_string()
        } else {
            rpc_url
        };

        let metadata_ttl = Duration::from_millis(config.metadata_cache_ttl_ms);
        let status = Arc::new(StatusCell::new());
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            executor: OperationExecutor::new("metaplex", status.clone(), config),
            status,
            stats: Arc::new(ApiStatsTracker::new()),
            metadata_cache: ResponseCache::new(metadata_ttl),
            creator_cache: ResponseCache::new(metadata_ttl),
            rpc_url,
        })
    }

    pub async fn get_stats(&self) -> crate::apis::ApiStats {
        self.stats.get_stats().await
    }

    async fn rpc_call<T>(
        &self,
        endpoint: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
    {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let start = Instant::now();
        let response = self.http.client().post(&self.rpc_url).json(&body).send().await;
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
            self.stats
                .record_error(format!("{} HTTP {}", endpoint, status))
                .await;
            return Err(CoreError::api_error(
                "metaplex",
                endpoint,
                format!("HTTP {}", status),
            )
            .with_retryable(status.as_u16() == 429 || status.is_server_error()));
        }

        let parsed: RpcResponse<T> = match response.json().await {
            Ok(value) => value,
            Err(err) => {
                self.stats.record_request(false, elapsed).await;
                self.stats
                    .record_error(format!("{} parse error: {}", endpoint, err))
                    .await;
                return Err(CoreError::api_error(
                    "metaplex",
                    endpoint,
                    format!("failed to parse response: {}", err),
                ));
            }
        };

        if let Some(error) = parsed.error {
            self.stats.record_request(false, elapsed).await;
            self.stats
                .record_error(format!("{} RPC error {}: {}", endpoint, error.code, error.message))
                .await;
            return Err(CoreError::api_error(
                "metaplex",
                endpoint,
                format!("RPC error {}: {}", error.code, error.message),
            ));
        }

        self.stats.record_request(true, elapsed).await;
        parsed.result.ok_or_else(|| {
            CoreError::api_error("metaplex", endpoint, "empty RPC result".to_string())
        })
    }

    fn asset_to_metadata(mint: &str, asset: DasAsset) -> TokenMetadata {
        let (name, symbol, uri) = match asset.content {
            Some(content) => {
                let (name, symbol) = match content.metadata {
                    Some(meta) => (meta.name, meta.symbol),
                    None => (None, None),
                };
                (name, symbol, content.json_uri)
            }
            None => (None, None, None),
        };

        let collection_verified = asset
            .grouping
            .iter()
            .any(|g| g.group_key == "collection" && g.verified.unwrap_or(false));

        TokenMetadata {
            mint: mint.to_string(),
            name,
            symbol,
            uri,
            mutable: asset.mutable,
            creators: asset
                .creators
                .into_iter()
                .map(|c| Creator {
                    address: c.address,
                    verified: c.verified,
                    share: c.share,
                })
                .collect(),
            collection_verified,
        }
    }

    async fn fetch_metadata(&self, mint: &str) -> Result<TokenMetadata, CoreError> {
        let asset: DasAsset = self
            .rpc_call("get_metadata", "getAsset", serde_json::json!({ "id": mint }))
            .await?;
        Ok(Self::asset_to_metadata(mint, asset))
    }

    async fn fetch_creator_history(&self, address: &str) -> Result<CreatorVerification, CoreError> {
        let list: DasAssetList = self
            .rpc_call(
                "verify_creator",
                "getAssetsByCreator",
                serde_json::json!({
                    "creatorAddress": address,
                    "onlyVerified": false,
                    "limit": CREATOR_HISTORY_LIMIT,
                    "page": 1,
                }),
            )
            .await?;

        let total = list.total.max(list.items.len() as u32);
        // A past project counts as successful when this creator signed it
        let successful = list
            .items
            .iter()
            .filter(|asset| {
                asset
                    .creators
                    .iter()
                    .any(|c| c.address == address && c.verified)
            })
            .count() as u32;

        Ok(CreatorVerification {
            address: address.to_string(),
            verified: successful > 0,
            total_projects: total,
            successful_projects: successful,
            risk_score: risk::creator_risk_score(total, successful),
        })
    }
}

#[async_trait]
impl Service for MetaplexProvider {
    fn name(&self) -> &str {
        "metaplex"
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        logger::info(LogTag::Metaplex, "Probing DAS RPC connectivity");
        let health: String = self.rpc_call("probe", "getHealth", serde_json::json!([])).await?;
        if health != "ok" {
            return Err(CoreError::api_error(
                "metaplex",
                "probe",
                format!("RPC unhealthy: {}", health),
            ));
        }
        logger::info(LogTag::Metaplex, "Metaplex provider ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CoreError> {
        self.executor.reset();
        self.metadata_cache.clear();
        self.creator_cache.clear();
        logger::info(LogTag::Metaplex, "Metaplex provider stopped");
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MetaplexProvider {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            can_get_metadata: true,
            can_verify_creators: true,
            can_validate_token: true,
            ..ProviderCapabilities::default()
        }
    }

    async fn get_metadata(&self, mint: &str) -> Result<TokenMetadata, CoreError> {
        validate_mint(mint)?;

        if let Some(cached) = self.metadata_cache.get(mint) {
            self.stats.record_cache_hit();
            logger::debug(LogTag::Cache, &format!("metadata cache hit: {}", mint));
            return Ok(cached);
        }
        self.stats.record_cache_miss();
        logger::debug(LogTag::Cache, &format!("metadata cache miss: {}", mint));

        let metadata = self
            .executor
            .execute("get_metadata", || self.fetch_metadata(mint))
            .await?;
        self.metadata_cache.insert(mint, metadata.clone());
        Ok(metadata)
    }

    async fn verify_creator(&self, address: &str) -> Result<CreatorVerification, CoreError> {
        validate_mint(address)?;

        if let Some(cached) = self.creator_cache.get(address) {
            self.stats.record_cache_hit();
            logger::debug(LogTag::Cache, &format!("creator cache hit: {}", address));
            return Ok(cached);
        }
        self.stats.record_cache_miss();
        logger::debug(LogTag::Cache, &format!("creator cache miss: {}", address));

        let verification = self
            .executor
            .execute("verify_creator", || self.fetch_creator_history(address))
            .await?;
        self.creator_cache.insert(address, verification.clone());
        Ok(verification)
    }

    async fn validate_token(&self, mint: &str) -> Result<TokenValidation, CoreError> {
        let metadata = self.get_metadata(mint).await?;

        let creator = match metadata.creators.first() {
            Some(on_token) => {
                let mut verification = self.verify_creator(&on_token.address).await?;
                // The token's own creator signature is authoritative here
                verification.verified = on_token.verified;
                Some(verification)
            }
            None => None,
        };

        let (risk_score, factors) = risk::assess_token(&metadata, creator.as_ref());

        logger::info(
            LogTag::Metaplex,
            &format!(
                "Token validated: {} risk={:.2} factors={}",
                mint,
                risk_score,
                factors.len()
            ),
        );

        Ok(TokenValidation {
            mint: mint.to_string(),
            risk_score,
            factors,
        })
    }
}
