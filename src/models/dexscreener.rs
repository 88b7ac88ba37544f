use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Social {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Website {
    pub label: String,
    pub url: String,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct TxnCount {
    pub buys: u64,
    pub sells: u64,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Txns {
    #[serde(default)]
    pub m5: TxnCount,
    #[serde(default)]
    pub h1: TxnCount,
    #[serde(default)]
    pub h6: TxnCount,
    #[serde(default)]
    pub h24: TxnCount,
}

/// Per-window figures. The API drops windows with no activity.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Windows {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub image_url: Option<String>,
    pub header: Option<String>,
    pub open_graph: Option<String>,
    pub websites: Option<Vec<Website>>,
    pub socials: Option<Vec<Social>>,
}

/// A trading pair as returned by DexScreener. Never mutated locally.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub chain_id: String,
    pub dex_id: String,
    pub url: String,
    pub pair_address: String,
    pub labels: Option<Vec<String>>,
    pub base_token: TokenInfo,
    pub quote_token: TokenInfo,
    pub price_native: String,
    pub price_usd: Option<String>,
    #[serde(default)]
    pub txns: Txns,
    #[serde(default)]
    pub volume: Windows,
    #[serde(default)]
    pub price_change: Windows,
    #[serde(default)]
    pub liquidity: Liquidity,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    pub pair_created_at: Option<u64>,
    pub info: Option<PairInfo>,
}

impl TokenPair {
    /// `Name (SYMBOL)`, the label used when a pair gets starred.
    pub fn display_name(&self) -> String {
        format!(
            "{} ({})",
            self.base_token.name,
            self.base_token.symbol.to_uppercase()
        )
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub schema_version: String,
    #[serde(default)]
    pub pairs: Option<Vec<TokenPair>>,
}

impl SearchResult {
    pub fn pairs(&self) -> &[TokenPair] {
        self.pairs.as_deref().unwrap_or_default()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs().len()
    }
}
