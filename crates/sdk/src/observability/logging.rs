//! Structured logging decorator.

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{error, info};

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Logs every fetch before and after delegating to the wrapped provider.
///
/// Events go to the global `tracing` dispatcher: an info event on entry, then
/// an info event with the price or an error event with the failure, both
/// carrying the elapsed time.
pub struct LoggingProvider<P> {
    name: String,
    inner: P,
}

impl<P: QuoteProvider> LoggingProvider<P> {
    pub fn new(name: impl Into<String>, inner: P) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for LoggingProvider<P> {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        let start = Instant::now();
        info!(provider = %self.name, symbol, "fetching quote");

        let result = self.inner.fetch(ctx, symbol).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(quote) => info!(
                provider = %self.name,
                symbol,
                price = %quote.price,
                duration_ms,
                "fetched quote"
            ),
            Err(e) => error!(
                provider = %self.name,
                symbol,
                error = %e,
                duration_ms,
                "failed to fetch quote"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_events, MockProvider};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;

    #[tokio::test]
    async fn test_passes_quote_through() {
        let mock = Arc::new(MockProvider::succeeding(dec!(64000)));
        let logged = LoggingProvider::new("crypto", Arc::clone(&mock));

        let q = logged.fetch(&FetchContext::new(), "bitcoin").await.unwrap();

        assert_eq!(q.price, dec!(64000));
        assert_eq!(q.symbol, "bitcoin");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_passes_error_through_unchanged() {
        let mock = Arc::new(MockProvider::failing());
        let logged = LoggingProvider::new("crypto", Arc::clone(&mock));

        let err = logged
            .fetch(&FetchContext::new(), "bitcoin")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "mock: upstream failure");
    }

    #[tokio::test(start_paused = true)]
    async fn test_logs_request_and_price() {
        let (_guard, events) = capture_events();
        let mock =
            Arc::new(MockProvider::succeeding(dec!(64000)).with_delay(Duration::from_millis(250)));
        let logged = LoggingProvider::new("crypto", mock);

        logged.fetch(&FetchContext::new(), "bitcoin").await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);

        let before = &events[0];
        assert_eq!(before.level, Level::INFO);
        assert_eq!(before.message(), "fetching quote");
        assert_eq!(before.field("provider"), Some("crypto"));
        assert_eq!(before.field("symbol"), Some("bitcoin"));

        let after = &events[1];
        assert_eq!(after.level, Level::INFO);
        assert_eq!(after.message(), "fetched quote");
        assert_eq!(after.field("provider"), Some("crypto"));
        assert_eq!(after.field("price"), Some("64000"));
        assert!(after.field("error").is_none());
        let duration_ms: u64 = after.field("duration_ms").unwrap().parse().unwrap();
        assert!(duration_ms >= 250, "{duration_ms}");
    }

    #[tokio::test]
    async fn test_logs_failure_at_error_level() {
        let (_guard, events) = capture_events();
        let logged = LoggingProvider::new("stock", MockProvider::failing());

        let _ = logged.fetch(&FetchContext::new(), "AAPL").await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);

        let after = &events[1];
        assert_eq!(after.level, Level::ERROR);
        assert_eq!(after.message(), "failed to fetch quote");
        assert_eq!(after.field("symbol"), Some("AAPL"));
        assert_eq!(after.field("error"), Some("mock: upstream failure"));
        assert!(after.field("price").is_none());
        assert!(after.field("duration_ms").is_some());
    }

    #[tokio::test]
    async fn test_outer_layer_runs_first_and_observes_last() {
        let (_guard, events) = capture_events();
        let inner = LoggingProvider::new("inner", MockProvider::succeeding(dec!(1)));
        let outer = LoggingProvider::new("outer", inner);

        outer.fetch(&FetchContext::new(), "bitcoin").await.unwrap();

        let order: Vec<(String, String)> = events
            .lock()
            .unwrap()
            .iter()
            .map(|e| {
                (
                    e.field("provider").unwrap_or_default().to_string(),
                    e.message().to_string(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("outer".to_string(), "fetching quote".to_string()),
                ("inner".to_string(), "fetching quote".to_string()),
                ("inner".to_string(), "fetched quote".to_string()),
                ("outer".to_string(), "fetched quote".to_string()),
            ]
        );
    }
}
