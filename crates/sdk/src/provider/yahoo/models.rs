//! Yahoo Finance chart API response models.
//!
//! Only the `meta` block of the first result is modelled; the indicator
//! arrays are not needed for a latest quote.

use serde::Deserialize;

/// Main response wrapper for the chart API
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub regular_market_price: f64,
    pub regular_market_time: i64,
    #[serde(default)]
    pub chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}
