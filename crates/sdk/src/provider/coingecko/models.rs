//! CoinGecko API response models.

use std::collections::HashMap;

use serde::Deserialize;

/// Response of `/simple/price`, keyed by coin id.
pub type SimplePriceResponse = HashMap<String, SimplePrice>;

/// USD figures for a single coin.
#[derive(Debug, Deserialize)]
pub struct SimplePrice {
    pub usd: f64,
    pub usd_24h_change: Option<f64>,
    pub usd_24h_vol: Option<f64>,
    // Note: last_updated_at is only sent with include_last_updated_at=true
}
