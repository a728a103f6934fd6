//! Yahoo Finance stock quote provider.
//!
//! Uses the v8 chart endpoint, which serves equities, ETFs and indices
//! (e.g. AAPL, SHOP.TO, ^GSPC) without authentication.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::body::{decode_json, read_body, MAX_BODY_BYTES};
use crate::provider::QuoteProvider;

use models::ChartResponse;

/// Provider ID constant
pub const PROVIDER_ID: &str = "yahoo";

/// Public chart API root
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo rejects requests without a browser-like User-Agent
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Yahoo Finance stock quote provider.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a provider against the public Yahoo Finance API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a provider against a custom chart API root (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let url = format!(
            "{}/{}?interval=1m&range=1d",
            self.base_url,
            urlencoding::encode(symbol)
        );

        let mut response = self.client.get(&url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let mut body = Vec::new();
        read_body(PROVIDER_ID, &mut response, &mut body, MAX_BODY_BYTES).await?;
        let data: ChartResponse = decode_json(PROVIDER_ID, &body)?;

        if let Some(error) = data.chart.error {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                format!("yahoo api error: {} - {}", error.code, error.description),
            ));
        }

        let meta = data
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.meta)
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                provider: PROVIDER_ID.to_string(),
                symbol: symbol.to_string(),
            })?;

        let price = Decimal::from_f64(meta.regular_market_price).ok_or_else(|| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("invalid price: {}", meta.regular_market_price),
            )
        })?;

        // Change is measured against the previous close; without one it is unknown.
        let change = meta
            .chart_previous_close
            .and_then(|close| Decimal::from_f64(meta.regular_market_price - close))
            .unwrap_or_default();

        let last_updated = Self::market_time(meta.regular_market_time);

        debug!(symbol = %meta.symbol, %price, "decoded yahoo chart meta");

        // Volume lives in the indicator arrays, which this endpoint does not summarize.
        Ok(Quote::new(meta.symbol, price, last_updated, PROVIDER_ID).with_change_24h(change))
    }

    /// Convert the market time (unix seconds) to a UTC timestamp.
    fn market_time(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().unwrap_or_else(|| {
            warn!(seconds, "invalid regularMarketTime, using current time");
            Utc::now()
        })
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        ctx.run(self.request(symbol)).await
    }
}
