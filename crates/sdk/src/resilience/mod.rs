//! Resilience decorators.
//!
//! Each decorator wraps a [`QuoteProvider`](crate::provider::QuoteProvider)
//! and implements the same trait, adding one behavior:
//! - Circuit breaking for fault tolerance
//! - Retry with exponential backoff for transient failures
//! - Token bucket rate limiting for outbound call rate

mod circuit_breaker;
mod rate_limiter;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rate_limiter::RateLimiter;
pub use retry::{Retry, RetryConfig};
