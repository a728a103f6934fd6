//! Decorator chain assembly.

use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::observability::{
    LoggingProvider, MetricsCollector, MetricsProvider, Tracer, TracingProvider,
};
use crate::provider::QuoteProvider;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, RateLimiter, Retry, RetryConfig};

/// Builds a decorator chain from the inside out.
///
/// Each `with_*` call wraps everything added so far, so the last layer added
/// is the outermost one and sees every call first:
///
/// ```no_run
/// # use markets_sdk::{ChainBuilder, CoinGeckoProvider, RetryConfig, CircuitBreakerConfig};
/// # async fn build() -> Result<(), markets_sdk::MarketDataError> {
/// // Logging(Retry(CircuitBreaker(RateLimiter(CoinGecko))))
/// let crypto = ChainBuilder::new("crypto", CoinGeckoProvider::new())
///     .rate_limited(5)?
///     .with_circuit_breaker(CircuitBreakerConfig::default())?
///     .with_retry(RetryConfig::default())
///     .with_logging()
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct ChainBuilder {
    name: String,
    provider: Arc<dyn QuoteProvider>,
}

impl ChainBuilder {
    pub fn new(name: impl Into<String>, provider: impl QuoteProvider + 'static) -> Self {
        Self {
            name: name.into(),
            provider: Arc::new(provider),
        }
    }

    /// Wrap in a token bucket limiter. Needs a running tokio runtime.
    pub fn rate_limited(self, rps: u32) -> Result<Self, MarketDataError> {
        let Self { name, provider } = self;
        let limiter = RateLimiter::new(name.clone(), provider, rps)?;
        Ok(Self::wrap(name, limiter))
    }

    pub fn with_retry(self, config: RetryConfig) -> Self {
        let Self { name, provider } = self;
        let retry = Retry::new(name.clone(), provider, config);
        Self::wrap(name, retry)
    }

    /// Wrap in a circuit breaker. A zero failure threshold is rejected.
    pub fn with_circuit_breaker(
        self,
        config: CircuitBreakerConfig,
    ) -> Result<Self, MarketDataError> {
        let Self { name, provider } = self;
        let breaker = CircuitBreaker::new(name.clone(), provider, config)?;
        Ok(Self::wrap(name, breaker))
    }

    pub fn with_logging(self) -> Self {
        let Self { name, provider } = self;
        let logging = LoggingProvider::new(name.clone(), provider);
        Self::wrap(name, logging)
    }

    pub fn with_metrics(self, collector: Option<Arc<dyn MetricsCollector>>) -> Self {
        let Self { name, provider } = self;
        let metrics = MetricsProvider::new(name.clone(), provider, collector);
        Self::wrap(name, metrics)
    }

    pub fn with_tracing(self, tracer: Option<Arc<dyn Tracer>>) -> Self {
        let Self { name, provider } = self;
        let tracing = TracingProvider::new(name.clone(), provider, tracer);
        Self::wrap(name, tracing)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finish the chain, ready for [`MarketClient::register`](super::MarketClient::register).
    pub fn build(self) -> Arc<dyn QuoteProvider> {
        self.provider
    }

    fn wrap(name: String, provider: impl QuoteProvider + 'static) -> Self {
        Self {
            name,
            provider: Arc::new(provider),
        }
    }
}
