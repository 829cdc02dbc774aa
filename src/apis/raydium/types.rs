/// Raydium V3 API response types
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct RaydiumPriceResponse {
    pub success: bool,
    /// Mint address -> price as a decimal string
    #[serde(default)]
    pub data: HashMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RaydiumPoolsResponse {
    pub success: bool,
    pub data: Option<RaydiumPoolPage>,
}

#[derive(Debug, Deserialize)]
pub struct RaydiumPoolPage {
    #[serde(default)]
    pub data: Vec<RaydiumPool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumPool {
    pub price: f64,
    /// Reserve of the base mint in the pool
    pub mint_amount_a: f64,
    /// Reserve of the quote mint in the pool
    pub mint_amount_b: f64,
    #[serde(default)]
    pub tvl: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RaydiumVersionResponse {
    pub success: bool,
}
