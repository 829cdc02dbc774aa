/// DAS (Digital Asset Standard) JSON-RPC response types
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasAsset {
    pub id: String,
    #[serde(default)]
    pub content: Option<DasContent>,
    #[serde(default)]
    pub mutable: bool,
    #[serde(default)]
    pub creators: Vec<DasCreator>,
    #[serde(default)]
    pub grouping: Vec<DasGrouping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasContent {
    #[serde(default)]
    pub json_uri: Option<String>,
    #[serde(default)]
    pub metadata: Option<DasMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasCreator {
    pub address: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub share: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasGrouping {
    pub group_key: String,
    #[serde(default)]
    pub verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DasAssetList {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items: Vec<DasAsset>,
}
