//! Observability decorators.
//!
//! Each decorator only observes the call it wraps: results and errors are
//! passed through untouched.
//! - [`LoggingProvider`] emits structured `tracing` events around each call
//! - [`MetricsProvider`] reports outcome counts and durations to a [`MetricsCollector`]
//! - [`TracingProvider`] opens a [`Span`] per call through a [`Tracer`]

mod logging;
mod metrics;
mod trace;

pub use self::logging::LoggingProvider;
pub use self::metrics::{FacadeMetricsCollector, MetricsCollector, MetricsProvider, RequestStatus};
pub use self::trace::{Span, Tracer, TracingProvider, TracingTracer};
