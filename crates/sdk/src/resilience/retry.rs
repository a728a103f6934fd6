//! Retry decorator with deterministic exponential backoff.
//!
//! Attempt 0 runs immediately. Before retry `n` (counted from 1) the decorator
//! waits `base_delay * 2^(n-1)`; the wait races the fetch context, so a
//! cancelled or expired context aborts it at once. There is no jitter.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::context::FetchContext;
use crate::errors::{MarketDataError, RetryClass};
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Default number of retries after the first attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Retry configuration.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each later one.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryConfig {
    /// Delay to wait before `attempt` (0 = first attempt, never delayed).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Retries failed fetches on the wrapped provider.
///
/// Errors classified as [`RetryClass::Never`] (cancellation, unknown symbol)
/// are returned immediately and unwrapped. When every attempt fails the last
/// failure is wrapped in [`MarketDataError::RetriesExhausted`].
pub struct Retry<P> {
    name: String,
    inner: P,
    config: RetryConfig,
}

impl<P: QuoteProvider> Retry<P> {
    pub fn new(name: impl Into<String>, inner: P, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            inner,
            config,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for Retry<P> {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        let mut last_error = match self.inner.fetch(ctx, symbol).await {
            Ok(quote) => return Ok(quote),
            Err(e) if e.retry_class() == RetryClass::Never => return Err(e),
            Err(e) => e,
        };

        for attempt in 1..=self.config.max_retries {
            let delay = self.config.backoff_delay(attempt);
            debug!(
                "Retry: '{}' attempt {}/{} for {} in {:?} after: {}",
                self.name, attempt, self.config.max_retries, symbol, delay, last_error
            );

            tokio::select! {
                biased;
                err = ctx.done() => return Err(err),
                _ = tokio::time::sleep(delay) => {}
            }

            match self.inner.fetch(ctx, symbol).await {
                Ok(quote) => {
                    debug!(
                        "Retry: '{}' succeeded for {} on attempt {}",
                        self.name, symbol, attempt
                    );
                    return Ok(quote);
                }
                Err(e) if e.retry_class() == RetryClass::Never => return Err(e),
                Err(e) => last_error = e,
            }
        }

        warn!(
            "Retry: '{}' giving up on {} after {} retries: {}",
            self.name, symbol, self.config.max_retries, last_error
        );

        Err(MarketDataError::RetriesExhausted {
            retries: self.config.max_retries,
            source: Box::new(last_error),
        })
    }
}
