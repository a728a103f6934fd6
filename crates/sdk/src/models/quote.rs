use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalized price snapshot for an asset from a single source.
///
/// Quotes are produced fresh on every successful fetch and are never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol as reported by the provider (e.g. "bitcoin", "AAPL")
    pub symbol: String,

    /// Latest price
    pub price: Decimal,

    /// Change over the last 24 hours, zero when the provider omits it
    #[serde(default, skip_serializing_if = "Decimal::is_zero")]
    pub change_24h: Decimal,

    /// Traded volume, zero when the provider omits it
    #[serde(default, skip_serializing_if = "Decimal::is_zero")]
    pub volume: Decimal,

    /// Time the price was last updated
    pub last_updated: DateTime<Utc>,

    /// Originating provider (coingecko, yahoo, ...)
    pub source: String,
}

impl Quote {
    /// Create a quote with only the required fields; change and volume are zero.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        last_updated: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change_24h: Decimal::ZERO,
            volume: Decimal::ZERO,
            last_updated,
            source: source.into(),
        }
    }

    /// Set the 24 hour change.
    pub fn with_change_24h(mut self, change: Decimal) -> Self {
        self.change_24h = change;
        self
    }

    /// Set the traded volume.
    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = volume;
        self
    }
}
