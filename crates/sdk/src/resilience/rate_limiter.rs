//! Token bucket rate limiter decorator.
//!
//! The bucket holds at most `rps` tokens and starts full. A background task
//! adds one token every `1/rps` seconds; refills that find the bucket full
//! are discarded. Each call consumes one token before reaching the wrapped
//! provider, waiting for one if the bucket is empty.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::Semaphore;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Highest rate whose refill period is still at least one nanosecond.
pub const MAX_RPS: u32 = 1_000_000_000;

/// Caps the call rate to the wrapped provider at `rps` requests per second.
///
/// The refill task lives exactly as long as the limiter: it is stopped by
/// [`stop`](Self::stop) or when the limiter is dropped.
pub struct RateLimiter<P> {
    name: String,
    inner: P,
    rps: u32,
    tokens: Arc<Semaphore>,
    refill: CancellationToken,
}

impl<P: QuoteProvider> RateLimiter<P> {
    /// Wrap `inner` with a limiter of `rps` requests per second.
    ///
    /// Must be called from within a tokio runtime, which hosts the refill task.
    pub fn new(name: impl Into<String>, inner: P, rps: u32) -> Result<Self, MarketDataError> {
        if rps == 0 {
            return Err(MarketDataError::InvalidConfig(
                "rate limit must allow at least 1 request per second".to_string(),
            ));
        }
        if rps > MAX_RPS {
            return Err(MarketDataError::InvalidConfig(format!(
                "rate limit of {} requests per second exceeds the maximum of {}",
                rps, MAX_RPS
            )));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            MarketDataError::InvalidConfig(
                "rate limiter must be created inside a tokio runtime".to_string(),
            )
        })?;

        let name = name.into();
        let capacity = rps as usize;
        let tokens = Arc::new(Semaphore::new(capacity));
        let refill = CancellationToken::new();
        let period = Duration::from_secs(1) / rps;

        runtime.spawn(refill_tokens(
            name.clone(),
            Arc::clone(&tokens),
            capacity,
            period,
            refill.clone(),
        ));

        Ok(Self {
            name,
            inner,
            rps,
            tokens,
            refill,
        })
    }

    /// Stop the refill task and reject further calls.
    ///
    /// Pending and later calls fail with [`MarketDataError::RateLimiterStopped`].
    pub fn stop(&self) {
        if !self.refill.is_cancelled() {
            info!("Rate limiter: stopping '{}'", self.name);
        }
        self.refill.cancel();
        self.tokens.close();
    }

    /// Tokens currently in the bucket.
    pub fn available_tokens(&self) -> usize {
        self.tokens.available_permits()
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    /// Take one token, waiting for a refill if needed.
    async fn acquire(&self, ctx: &FetchContext) -> Result<(), MarketDataError> {
        let permit = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            permit = self.tokens.acquire() => {
                permit.map_err(|_| MarketDataError::RateLimiterStopped)?
            }
        };
        // Tokens are consumed, not returned; only the refill task adds them back.
        permit.forget();
        Ok(())
    }
}

impl<P> Drop for RateLimiter<P> {
    fn drop(&mut self) {
        self.refill.cancel();
    }
}

/// Add one token per `period` until `stop` is cancelled, never exceeding `capacity`.
async fn refill_tokens(
    name: String,
    tokens: Arc<Semaphore>,
    capacity: usize,
    period: Duration,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                // Only this task adds permits, so the count cannot pass capacity in between.
                if tokens.available_permits() < capacity {
                    tokens.add_permits(1);
                }
            }
        }
    }

    debug!("Rate limiter: refill task for '{}' exited", name);
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for RateLimiter<P> {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        self.acquire(ctx).await?;
        self.inner.fetch(ctx, symbol).await
    }
}
