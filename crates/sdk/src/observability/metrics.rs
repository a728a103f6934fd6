//! Request metrics decorator and collector abstraction.

use std::fmt;
use std::sync::Arc;

use ::metrics::{counter, histogram};
use async_trait::async_trait;
use tokio::time::Instant;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Counter of fetches, labelled by `provider` and `status`.
pub const REQUESTS_TOTAL: &str = "market_data_requests_total";

/// Histogram of fetch durations in seconds, labelled by `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "market_data_request_duration_seconds";

/// Outcome of a single fetch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestStatus {
    Success,
    Error,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for request metrics (Prometheus, StatsD, test doubles, ...).
pub trait MetricsCollector: Send + Sync {
    /// Count one finished request.
    fn inc_request(&self, provider: &str, status: RequestStatus);

    /// Record how long a request took, in seconds.
    fn observe_duration(&self, provider: &str, seconds: f64);
}

/// Collector that reports through the `metrics` facade.
///
/// Whatever recorder the application installs (e.g. a Prometheus exporter)
/// receives the data; with no recorder installed this is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct FacadeMetricsCollector;

impl MetricsCollector for FacadeMetricsCollector {
    fn inc_request(&self, provider: &str, status: RequestStatus) {
        counter!(
            REQUESTS_TOTAL,
            "provider" => provider.to_string(),
            "status" => status.as_str()
        )
        .increment(1);
    }

    fn observe_duration(&self, provider: &str, seconds: f64) {
        histogram!(REQUEST_DURATION_SECONDS, "provider" => provider.to_string()).record(seconds);
    }
}

/// Records outcome and duration of every fetch on the wrapped provider.
///
/// Without a collector the decorator delegates directly.
pub struct MetricsProvider<P> {
    name: String,
    inner: P,
    collector: Option<Arc<dyn MetricsCollector>>,
}

impl<P: QuoteProvider> MetricsProvider<P> {
    pub fn new(
        name: impl Into<String>,
        inner: P,
        collector: Option<Arc<dyn MetricsCollector>>,
    ) -> Self {
        Self {
            name: name.into(),
            inner,
            collector,
        }
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for MetricsProvider<P> {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        let Some(collector) = &self.collector else {
            return self.inner.fetch(ctx, symbol).await;
        };

        let start = Instant::now();
        let result = self.inner.fetch(ctx, symbol).await;
        let seconds = start.elapsed().as_secs_f64();

        let status = if result.is_ok() {
            RequestStatus::Success
        } else {
            RequestStatus::Error
        };
        collector.inc_request(&self.name, status);
        collector.observe_duration(&self.name, seconds);

        result
    }
}
