//! Distributed tracing decorator.
//!
//! The decorator is written against a small [`Tracer`] abstraction so any
//! backend can be plugged in. [`TracingTracer`] maps spans onto the `tracing`
//! crate, which in turn can export to OpenTelemetry through a subscriber layer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::field::{display, Empty};
use tracing::Instrument;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// A unit of traced work.
pub trait Span: Send {
    /// Finish the span. Called exactly once by [`TracingProvider`].
    fn end(&mut self);

    /// Attach a failure to the span.
    fn record_error(&mut self, error: &MarketDataError);

    /// The `tracing` span the traced future is instrumented with.
    fn as_tracing_span(&self) -> tracing::Span {
        tracing::Span::none()
    }
}

/// Starts spans for traced operations.
pub trait Tracer: Send + Sync {
    /// Start a span named `span_name` as a child of `ctx`.
    ///
    /// Returns the context the traced operation should run under.
    fn start(&self, ctx: &FetchContext, span_name: &str) -> (FetchContext, Box<dyn Span>);
}

/// [`Tracer`] backed by the `tracing` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start(&self, ctx: &FetchContext, span_name: &str) -> (FetchContext, Box<dyn Span>) {
        let span = tracing::info_span!("fetch_quote", otel.name = %span_name, error = Empty);
        (ctx.clone(), Box::new(TracingSpan { span: Some(span) }))
    }
}

struct TracingSpan {
    span: Option<tracing::Span>,
}

impl Span for TracingSpan {
    fn end(&mut self) {
        // Closing happens when the last handle is dropped.
        self.span.take();
    }

    fn record_error(&mut self, error: &MarketDataError) {
        if let Some(span) = &self.span {
            span.record("error", display(error));
        }
    }

    fn as_tracing_span(&self) -> tracing::Span {
        self.span.clone().unwrap_or_else(tracing::Span::none)
    }
}

/// Ends the span on drop, so a cancelled fetch still closes it.
struct SpanGuard(Box<dyn Span>);

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// Wraps every fetch in a span named `GetQuote/<name>`.
///
/// Without a tracer the decorator delegates directly.
pub struct TracingProvider<P> {
    name: String,
    inner: P,
    tracer: Option<Arc<dyn Tracer>>,
}

impl<P: QuoteProvider> TracingProvider<P> {
    pub fn new(name: impl Into<String>, inner: P, tracer: Option<Arc<dyn Tracer>>) -> Self {
        Self {
            name: name.into(),
            inner,
            tracer,
        }
    }

    fn span_name(&self) -> String {
        format!("GetQuote/{}", self.name)
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for TracingProvider<P> {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        let Some(tracer) = &self.tracer else {
            return self.inner.fetch(ctx, symbol).await;
        };

        let (span_ctx, span) = tracer.start(ctx, &self.span_name());
        let mut guard = SpanGuard(span);

        let result = self
            .inner
            .fetch(&span_ctx, symbol)
            .instrument(guard.0.as_tracing_span())
            .await;

        if let Err(e) = &result {
            guard.0.record_error(e);
        }

        result
    }
}
