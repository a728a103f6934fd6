//! Cancellation and deadline context passed through every quote fetch.
//!
//! A [`FetchContext`] is cheap to clone. Derived contexts share the parent's
//! cancellation (cancelling the parent cancels every child) and can only
//! tighten the deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::MarketDataError;

/// Cancellation signal plus optional deadline for a single fetch.
#[derive(Clone, Debug)]
pub struct FetchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl FetchContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Derive a child context that expires after `timeout`.
    ///
    /// A timeout too large to represent as an instant means no deadline of
    /// its own; the parent's deadline still applies.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a child context that expires at `deadline`, or at the
    /// parent's deadline if that comes first.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context that can be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and all contexts derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason this context is done, or `None` while it is live.
    ///
    /// Cancellation wins over an expired deadline.
    pub fn err(&self) -> Option<MarketDataError> {
        if self.token.is_cancelled() {
            return Some(MarketDataError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(MarketDataError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> MarketDataError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => MarketDataError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => MarketDataError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                MarketDataError::Cancelled
            }
        }
    }

    /// Race `future` against this context.
    ///
    /// The future is dropped as soon as the context is done; its own result
    /// is returned unchanged when it finishes first.
    pub async fn run<T, F>(&self, future: F) -> Result<T, MarketDataError>
    where
        F: Future<Output = Result<T, MarketDataError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = future => result,
        }
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}
