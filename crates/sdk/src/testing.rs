//! Test doubles shared by the decorator unit tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

type Handler = Box<dyn Fn(u32, &str) -> Result<Quote, MarketDataError> + Send>;

/// Provider whose answers come from a swappable closure.
///
/// The closure receives the 1-based call number and the symbol.
pub(crate) struct MockProvider {
    calls: AtomicU32,
    delay: Option<Duration>,
    handler: Mutex<Handler>,
}

impl MockProvider {
    pub fn new(
        handler: impl Fn(u32, &str) -> Result<Quote, MarketDataError> + Send + 'static,
    ) -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay: None,
            handler: Mutex::new(Box::new(handler)),
        }
    }

    pub fn succeeding(price: Decimal) -> Self {
        Self::new(move |_, symbol| Ok(quote(symbol, price)))
    }

    pub fn failing() -> Self {
        Self::new(|_, _| Err(upstream_error()))
    }

    /// Wait `delay` (honoring the context) before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_handler(
        &self,
        handler: impl Fn(u32, &str) -> Result<Quote, MarketDataError> + Send + 'static,
    ) {
        *self.handler.lock().unwrap() = Box::new(handler);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    async fn fetch(&self, ctx: &FetchContext, symbol: &str) -> Result<Quote, MarketDataError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            ctx.run(async {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await?;
        }
        let handler = self.handler.lock().unwrap();
        handler(call, symbol)
    }
}

pub(crate) fn quote(symbol: &str, price: Decimal) -> Quote {
    Quote::new(symbol, price, Utc::now(), "mock")
}

pub(crate) fn upstream_error() -> MarketDataError {
    MarketDataError::provider("mock", "upstream failure")
}

/// A `tracing` event as seen by [`capture_events`].
#[derive(Clone, Debug)]
pub(crate) struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }
}

pub(crate) type CapturedEvents = Arc<Mutex<Vec<CapturedEvent>>>;

/// Route events on the current thread into a buffer until the guard drops.
pub(crate) fn capture_events() -> (DefaultGuard, CapturedEvents) {
    let events = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });
    (tracing::subscriber::set_default(subscriber), events)
}

struct CaptureLayer {
    events: CapturedEvents,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}
