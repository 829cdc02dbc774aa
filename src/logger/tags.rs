/// Log tags identify the area of the system a message came from.
///
/// Tags keep console output scannable and give filtering a stable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Services,
    Api,
    Cache,
    Birdeye,
    Raydium,
    Jupiter,
    Metaplex,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Services => "SERVICES",
            LogTag::Api => "API",
            LogTag::Cache => "CACHE",
            LogTag::Birdeye => "BIRDEYE",
            LogTag::Raydium => "RAYDIUM",
            LogTag::Jupiter => "JUPITER",
            LogTag::Metaplex => "METAPLEX",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
