//! Circuit breaker decorator for fault tolerance.
//!
//! Implements the circuit breaker pattern to stop calling a failing upstream.
//! The circuit has three states:
//!
//! - **Closed**: Normal operation, calls pass through.
//! - **Open**: The upstream is failing, calls fail immediately with
//!   [`MarketDataError::CircuitOpen`].
//! - **HalfOpen**: The reset timeout has elapsed; calls are let through as
//!   trials, and the first outcome decides whether the circuit closes again.
//!
//! The circuit state is in-memory and owned by the breaker instance.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::Instant;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Default number of consecutive failures before opening the circuit.
const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time to wait after the last failure before a trial call.
const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    /// Normal operation - calls are allowed.
    Closed,
    /// Upstream is failing - calls are rejected.
    Open,
    /// Testing recovery - trial calls are allowed.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Mutable circuit state, only touched under the breaker's lock.
#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    /// Number of consecutive failures.
    failure_count: u32,
    /// Time of the last failure (for the reset timeout).
    last_failure: Option<Instant>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Time after the last failure before a trial call is allowed.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// Circuit breaker around a single quote provider.
///
/// State checks before and after the upstream call are serialized through
/// one mutex; the upstream call itself runs without holding it, so a slow
/// request never blocks other callers.
pub struct CircuitBreaker<P> {
    name: String,
    inner: P,
    config: CircuitBreakerConfig,
    circuit: Mutex<Circuit>,
}

impl<P: QuoteProvider> CircuitBreaker<P> {
    /// Wrap `inner` with a breaker. A zero failure threshold is rejected.
    pub fn new(
        name: impl Into<String>,
        inner: P,
        config: CircuitBreakerConfig,
    ) -> Result<Self, MarketDataError> {
        if config.failure_threshold == 0 {
            return Err(MarketDataError::InvalidConfig(
                "circuit breaker failure threshold must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            inner,
            config,
            circuit: Mutex::new(Circuit::new()),
        })
    }

    /// Lock the circuit mutex, recovering from poison if necessary.
    fn lock_circuit(&self) -> MutexGuard<'_, Circuit> {
        self.circuit.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Decide whether a call may proceed.
    ///
    /// Handles the Open -> HalfOpen transition once the reset timeout has
    /// elapsed since the last failure.
    fn try_acquire(&self) -> Result<(), MarketDataError> {
        let mut circuit = self.lock_circuit();

        if circuit.state != CircuitState::Open {
            return Ok(());
        }

        let reset_elapsed = circuit
            .last_failure
            .map_or(true, |at| at.elapsed() >= self.config.reset_timeout);

        if reset_elapsed {
            info!(
                "Circuit breaker: transitioning '{}' from Open to HalfOpen",
                self.name
            );
            circuit.state = CircuitState::HalfOpen;
            Ok(())
        } else {
            debug!("Circuit breaker: rejecting call to '{}' (open)", self.name);
            Err(MarketDataError::CircuitOpen)
        }
    }

    /// Record a successful call.
    ///
    /// In Closed state: resets the failure count.
    /// In HalfOpen state: closes the circuit.
    fn record_success(&self) {
        let mut circuit = self.lock_circuit();

        match circuit.state {
            CircuitState::Closed => {
                circuit.failure_count = 0;
            }
            CircuitState::HalfOpen => {
                info!(
                    "Circuit breaker: closing circuit for '{}' after successful trial",
                    self.name
                );
                circuit.state = CircuitState::Closed;
                circuit.failure_count = 0;
                circuit.last_failure = None;
            }
            CircuitState::Open => {
                // A call admitted before the circuit opened finished late
                debug!(
                    "Circuit breaker: late success for '{}' while open, ignoring",
                    self.name
                );
            }
        }
    }

    /// Record a failed call.
    ///
    /// Opens the circuit once the threshold is reached. Any failure in
    /// HalfOpen immediately reopens it.
    fn record_failure(&self) {
        let mut circuit = self.lock_circuit();

        circuit.failure_count = circuit.failure_count.saturating_add(1);
        circuit.last_failure = Some(Instant::now());

        match circuit.state {
            CircuitState::Closed => {
                if circuit.failure_count >= self.config.failure_threshold {
                    info!(
                        "Circuit breaker: opening circuit for '{}' after {} failures",
                        self.name, circuit.failure_count
                    );
                    circuit.state = CircuitState::Open;
                } else {
                    debug!(
                        "Circuit breaker: failure for '{}' ({}/{})",
                        self.name, circuit.failure_count, self.config.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                info!(
                    "Circuit breaker: reopening circuit for '{}' after failed trial",
                    self.name
                );
                circuit.state = CircuitState::Open;
            }
            CircuitState::Open => {
                debug!(
                    "Circuit breaker: additional failure for '{}' (already open)",
                    self.name
                );
            }
        }
    }

    /// Current circuit state.
    ///
    /// An Open circuit whose reset timeout has elapsed still reports Open
    /// until the next call moves it to HalfOpen.
    pub fn state(&self) -> CircuitState {
        self.lock_circuit().state
    }

    /// Number of consecutive failures recorded.
    pub fn failure_count(&self) -> u32 {
        self.lock_circuit().failure_count
    }

    /// Force the circuit back to Closed.
    pub fn reset(&self) {
        info!("Circuit breaker: manually resetting circuit for '{}'", self.name);
        *self.lock_circuit() = Circuit::new();
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for CircuitBreaker<P> {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        self.try_acquire()?;

        let result = self.inner.fetch(ctx, symbol).await;

        match &result {
            Ok(_) => self.record_success(),
            Err(_) => self.record_failure(),
        }

        result
    }
}
