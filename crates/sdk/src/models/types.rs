use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of financial asset a provider serves.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Stock,
    Crypto,
}

impl AssetType {
    /// Registry key conventionally used for providers of this asset type.
    pub fn provider_key(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stock => write!(f, "STOCK"),
            Self::Crypto => write!(f, "CRYPTO"),
        }
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "crypto" => Ok(Self::Crypto),
            other => Err(format!("unknown asset type: {}", other)),
        }
    }
}
