/// Jupiter Price API v2 response types
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct JupiterPriceResponse {
    /// Mint address -> price entry; unknown mints map to null
    #[serde(default)]
    pub data: HashMap<String, Option<JupiterPriceEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JupiterPriceEntry {
    /// Decimal string
    pub price: String,
    #[serde(default)]
    pub extra_info: Option<JupiterExtraInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JupiterExtraInfo {
    #[serde(default)]
    pub depth: Option<JupiterDepth>,
}

/// Price impact ratios at standard notional depths
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JupiterDepth {
    #[serde(default)]
    pub buy_price_impact_ratio: Option<JupiterImpactRatio>,
    #[serde(default)]
    pub sell_price_impact_ratio: Option<JupiterImpactRatio>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JupiterImpactRatio {
    /// Notional (in SOL) -> impact ratio, e.g. "10" -> 0.013
    #[serde(default)]
    pub depth: HashMap<String, f64>,
}
