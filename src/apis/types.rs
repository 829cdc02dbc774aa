/// Shared data types returned by market-data providers
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Spot price for a token mint
#[derive(Debug, Clone, Serialize)]
pub struct PriceData {
    pub mint: String,
    /// Price in the provider's quote currency (USD unless noted)
    pub price: f64,
    pub liquidity: Option<f64>,
    pub updated_at: DateTime<Utc>,
    /// Provider that produced the value
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBookLevel {
    pub price: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBook {
    pub mint: String,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub updated_at: DateTime<Utc>,
    pub source: String,
}

/// One OHLCV candle
#[derive(Debug, Clone, Serialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    H1,
    H4,
    D1,
}

impl Timeframe {
    /// Birdeye-style interval identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::D1 => "1D",
        }
    }

    pub fn seconds(&self) -> u64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 300,
            Timeframe::M15 => 900,
            Timeframe::H1 => 3_600,
            Timeframe::H4 => 14_400,
            Timeframe::D1 => 86_400,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// On-chain token metadata (Metaplex shape)
#[derive(Debug, Clone, Serialize)]
pub struct TokenMetadata {
    pub mint: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub uri: Option<String>,
    pub mutable: bool,
    pub creators: Vec<Creator>,
    pub collection_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Creator {
    pub address: String,
    pub verified: bool,
    /// Royalty share in percent
    pub share: u8,
}

/// Result of a creator background check
#[derive(Debug, Clone, Serialize)]
pub struct CreatorVerification {
    pub address: String,
    pub verified: bool,
    pub total_projects: u32,
    pub successful_projects: u32,
    /// In [0, 1]; 1.0 means maximum risk
    pub risk_score: f64,
}

/// Aggregated token risk assessment
#[derive(Debug, Clone, Serialize)]
pub struct TokenValidation {
    pub mint: String,
    /// In [0, 1]; 1.0 means maximum risk
    pub risk_score: f64,
    pub factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskFactor {
    MissingName,
    MissingSymbol,
    UnverifiedCreator,
    MutableMetadata,
    NoCreatorInfo,
    HighRiskCreator,
}

impl RiskFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::MissingName => "MISSING_NAME",
            RiskFactor::MissingSymbol => "MISSING_SYMBOL",
            RiskFactor::UnverifiedCreator => "UNVERIFIED_CREATOR",
            RiskFactor::MutableMetadata => "MUTABLE_METADATA",
            RiskFactor::NoCreatorInfo => "NO_CREATOR_INFO",
            RiskFactor::HighRiskCreator => "HIGH_RISK_CREATOR",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RiskFactor::MissingName | RiskFactor::MissingSymbol => Severity::Low,
            RiskFactor::UnverifiedCreator | RiskFactor::MutableMetadata => Severity::Medium,
            RiskFactor::NoCreatorInfo | RiskFactor::HighRiskCreator => Severity::High,
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
