/// Birdeye API response types
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BirdeyePriceResponse {
    pub success: bool,
    pub data: Option<BirdeyePriceData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdeyePriceData {
    pub value: f64,
    #[serde(default)]
    pub liquidity: Option<f64>,
    #[serde(default)]
    pub update_unix_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BirdeyeOhlcvResponse {
    pub success: bool,
    pub data: Option<BirdeyeOhlcvData>,
}

#[derive(Debug, Deserialize)]
pub struct BirdeyeOhlcvData {
    #[serde(default)]
    pub items: Vec<BirdeyeOhlcvItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdeyeOhlcvItem {
    pub unix_time: i64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v: f64,
}
