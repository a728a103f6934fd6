//! Error types and retry classification for the markets SDK.
//!
//! - [`MarketDataError`]: The error enum returned by every quote fetch
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching quotes.
///
/// Upstream failures travel through the observability decorators unchanged;
/// resilience decorators count them and may wrap them with context.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The upstream returned a non-success status or an error payload,
    /// or its body could not be decoded.
    #[error("{provider}: {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A transport error occurred while talking to the upstream.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream response did not contain the requested symbol.
    #[error("symbol {symbol} not found in {provider} response")]
    SymbolNotFound {
        /// The provider that was queried
        provider: String,
        /// The missing symbol
        symbol: String,
    },

    /// The circuit breaker short-circuited the call; the upstream was not contacted.
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// Every attempt of a retried call failed.
    #[error("after {retries} retries: {source}")]
    RetriesExhausted {
        /// Number of retries performed after the first attempt
        retries: u32,
        /// The last underlying failure
        #[source]
        source: Box<MarketDataError>,
    },

    /// The fetch context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The fetch context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The rate limiter was stopped and hands out no more tokens.
    #[error("rate limiter is stopped")]
    RateLimiterStopped,

    /// No provider is registered under the requested name.
    #[error("provider {0} not found")]
    ProviderNotFound(String),

    /// A decorator was constructed with an unusable configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use markets_sdk::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::CircuitOpen;
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::Cancelled;
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // The caller gave up, or retrying cannot change the answer
            Self::Cancelled
            | Self::DeadlineExceeded
            | Self::SymbolNotFound { .. }
            | Self::ProviderNotFound(_)
            | Self::RateLimiterStopped
            | Self::InvalidConfig(_) => RetryClass::Never,

            Self::ProviderError { .. }
            | Self::Network(_)
            | Self::CircuitOpen
            | Self::RetriesExhausted { .. } => RetryClass::WithBackoff,
        }
    }

    /// Whether this error came from context cancellation or deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
