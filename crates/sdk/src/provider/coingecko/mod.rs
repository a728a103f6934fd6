//! CoinGecko crypto price provider.
//!
//! Uses the public `/simple/price` endpoint, priced in USD. Symbols are
//! CoinGecko coin ids (e.g. "bitcoin", "ethereum"), matched case-insensitively.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use num_traits::FromPrimitive;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use tracing::debug;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::body::{decode_json, read_body, MAX_BODY_BYTES};
use crate::provider::{BufferPool, QuoteProvider};

use models::SimplePriceResponse;

/// Provider ID constant
pub const PROVIDER_ID: &str = "coingecko";

/// Public API root
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// CoinGecko price provider.
///
/// # Example
///
/// ```ignore
/// use markets_sdk::CoinGeckoProvider;
///
/// let provider = CoinGeckoProvider::new();
/// let quote = provider.fetch(&FetchContext::new(), "bitcoin").await?;
/// ```
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    buffers: BufferPool,
}

impl CoinGeckoProvider {
    /// Create a provider against the public CoinGecko API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a provider against a custom API root (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            buffers: BufferPool::new(),
        }
    }

    async fn request(&self, id: &str, symbol: &str) -> Result<Quote, MarketDataError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_vol=true&include_24hr_change=true",
            self.base_url,
            urlencoding::encode(id)
        );

        let mut response = self.client.get(&url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let mut body = self.buffers.get();
        read_body(PROVIDER_ID, &mut response, &mut body, MAX_BODY_BYTES).await?;
        let data: SimplePriceResponse = decode_json(PROVIDER_ID, &body)?;

        let item = data
            .get(id)
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                provider: PROVIDER_ID.to_string(),
                symbol: symbol.to_string(),
            })?;

        let price = Decimal::from_f64(item.usd).ok_or_else(|| {
            MarketDataError::provider(PROVIDER_ID, format!("invalid price: {}", item.usd))
        })?;

        let change = item
            .usd_24h_change
            .and_then(Decimal::from_f64)
            .unwrap_or_default();
        let volume = item
            .usd_24h_vol
            .and_then(Decimal::from_f64)
            .unwrap_or_default();

        debug!(symbol, %price, "decoded coingecko price");

        Ok(Quote::new(symbol, price, Utc::now(), PROVIDER_ID)
            .with_change_24h(change)
            .with_volume(volume))
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        let id = symbol.to_lowercase();
        ctx.run(self.request(&id, symbol)).await
    }
}
