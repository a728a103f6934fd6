//! Quote provider trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;

/// Capability to fetch the latest quote for a symbol.
///
/// Implement this trait to add a new upstream integration, or to add a
/// cross-cutting behavior around an existing provider. Implementations may
/// keep internal state (counters, token pools), but each call must stand on
/// its own: the same symbol and context yield a quote or an error, nothing
/// else.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use markets_sdk::{FetchContext, MarketDataError, Quote, QuoteProvider};
///
/// struct FixedPrice;
///
/// #[async_trait]
/// impl QuoteProvider for FixedPrice {
///     async fn fetch(&self, _ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
///         Ok(Quote::new(symbol, dec!(1), Utc::now(), "fixed"))
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the latest quote for `symbol`.
    ///
    /// Every suspension point inside an implementation must honor `ctx` and
    /// return [`MarketDataError::Cancelled`] or
    /// [`MarketDataError::DeadlineExceeded`] once it is done.
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError>;
}

#[async_trait]
impl<P> QuoteProvider for Arc<P>
where
    P: QuoteProvider + ?Sized,
{
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        (**self).fetch(ctx, symbol).await
    }
}

#[async_trait]
impl<P> QuoteProvider for Box<P>
where
    P: QuoteProvider + ?Sized,
{
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        (**self).fetch(ctx, symbol).await
    }
}
