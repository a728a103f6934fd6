use std::sync::Arc;

use markets_sdk::{
    AssetType, ChainBuilder, CoinGeckoProvider, FacadeMetricsCollector, MarketClient,
    MetricsCollector, QuoteProvider, Tracer, TracingTracer, YahooProvider,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("MARKETS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only the quote.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Register a fully decorated provider for every asset type.
///
/// Must run inside the tokio runtime, which hosts the rate limiters.
pub fn build_client(config: &Config) -> anyhow::Result<MarketClient> {
    let client = MarketClient::new();

    let coingecko = CoinGeckoProvider::with_config(
        config
            .coingecko_base_url
            .as_deref()
            .unwrap_or(markets_sdk::provider::coingecko::DEFAULT_BASE_URL),
        config.request_timeout,
    );
    let yahoo = YahooProvider::with_config(
        config
            .yahoo_base_url
            .as_deref()
            .unwrap_or(markets_sdk::provider::yahoo::DEFAULT_BASE_URL),
        config.request_timeout,
    );

    client.register(
        AssetType::Crypto.provider_key(),
        decorate(AssetType::Crypto.provider_key(), coingecko, config)?,
    );
    client.register(
        AssetType::Stock.provider_key(),
        decorate(AssetType::Stock.provider_key(), yahoo, config)?,
    );

    tracing::debug!("Registered providers: {:?}", client.providers());
    Ok(client)
}

fn decorate(
    name: &str,
    provider: impl QuoteProvider + 'static,
    config: &Config,
) -> anyhow::Result<Arc<dyn QuoteProvider>> {
    let collector: Arc<dyn MetricsCollector> = Arc::new(FacadeMetricsCollector);
    let tracer: Arc<dyn Tracer> = Arc::new(TracingTracer);

    let chain = ChainBuilder::new(name, provider)
        .rate_limited(config.rate_limit_rps)?
        .with_retry(config.retry.clone())
        .with_circuit_breaker(config.breaker.clone())?
        .with_metrics(Some(collector))
        .with_tracing(Some(tracer))
        .with_logging()
        .build();

    Ok(chain)
}
