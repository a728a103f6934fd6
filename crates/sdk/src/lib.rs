//! Markets SDK
//!
//! Fetches price quotes for crypto and stock assets from third-party HTTP
//! APIs and normalizes them into a single [`Quote`] shape.
//!
//! # Overview
//!
//! Every upstream integration implements the single-method
//! [`QuoteProvider`] capability. Cross-cutting behavior is added by wrapping
//! a provider in decorators that implement the same trait:
//!
//! - Resilience: [`CircuitBreaker`], [`Retry`], [`RateLimiter`]
//! - Observability: [`LoggingProvider`], [`MetricsProvider`], [`TracingProvider`]
//!
//! # Architecture
//!
//! ```text
//!   caller
//!     |
//!     v
//! +--------------+    name     +-------------------------------+
//! | MarketClient | ----------> | Logging(Tracing(Retry(...)))  |  decorator chain
//! +--------------+             +-------------------------------+
//!                                              |
//!                                              v
//!                                  +----------------------+
//!                                  | CoinGecko / Yahoo    |  upstream integration
//!                                  +----------------------+
//!                                              |
//!                                              v
//!                                          Quote | MarketDataError
//! ```
//!
//! Decorators compose strictly by wrapping: the outermost layer's pre-call
//! logic runs first and it observes the result last.

pub mod context;
pub mod errors;
pub mod models;
pub mod observability;
pub mod provider;
pub mod registry;
pub mod resilience;

#[cfg(test)]
mod testing;

pub use context::FetchContext;
pub use errors::{MarketDataError, RetryClass};
pub use models::{AssetType, Quote};

pub use provider::coingecko::CoinGeckoProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::QuoteProvider;

pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, RateLimiter, Retry, RetryConfig,
};

pub use observability::{
    FacadeMetricsCollector, LoggingProvider, MetricsCollector, MetricsProvider, RequestStatus,
    Span, Tracer, TracingProvider, TracingTracer,
};

pub use registry::{ChainBuilder, MarketClient};
