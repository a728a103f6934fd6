//! Named provider lookup.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use crate::context::FetchContext;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

type Providers = HashMap<String, Arc<dyn QuoteProvider>>;

/// Routes quote requests to providers registered under a name.
///
/// Registration is expected at startup, but the map is guarded so that
/// registering while fetches are in flight is safe. Registering an existing
/// name replaces the previous provider.
#[derive(Default)]
pub struct MarketClient {
    providers: RwLock<Providers>,
}

impl MarketClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, provider: Arc<dyn QuoteProvider>) {
        let name = name.into();
        if self.write_providers().insert(name.clone(), provider).is_some() {
            warn!("Market client: replaced provider '{}'", name);
        } else {
            debug!("Market client: registered provider '{}'", name);
        }
    }

    /// Fetch `symbol` from the provider registered under `name`.
    ///
    /// Provider errors are returned unchanged.
    pub async fn fetch(
        &self,
        ctx: &FetchContext,
        name: &str,
        symbol: &str,
    ) -> Result<Quote, MarketDataError> {
        // The lock is released before the fetch is awaited.
        let provider = self
            .read_providers()
            .get(name)
            .cloned()
            .ok_or_else(|| MarketDataError::ProviderNotFound(name.to_string()))?;

        provider.fetch(ctx, symbol).await
    }

    /// Registered provider names, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_providers().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_providers().contains_key(name)
    }

    fn read_providers(&self) -> RwLockReadGuard<'_, Providers> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_providers(&self) -> RwLockWriteGuard<'_, Providers> {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_unknown_provider_is_named_in_error() {
        let client = MarketClient::new();

        let err = client
            .fetch(&FetchContext::new(), "forex", "EURUSD")
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::ProviderNotFound(ref name) if name == "forex"));
        assert_eq!(err.to_string(), "provider forex not found");
    }

    #[tokio::test]
    async fn test_routes_by_name() {
        let client = MarketClient::new();
        let crypto = Arc::new(MockProvider::succeeding(dec!(64000)));
        let stock = Arc::new(MockProvider::succeeding(dec!(190)));
        client.register("crypto", crypto.clone());
        client.register("stock", stock.clone());

        let q = client
            .fetch(&FetchContext::new(), "stock", "AAPL")
            .await
            .unwrap();

        assert_eq!(q.price, dec!(190));
        assert_eq!(stock.calls(), 1);
        assert_eq!(crypto.calls(), 0);
        assert_eq!(client.providers(), vec!["crypto", "stock"]);
        assert!(client.contains("crypto"));
        assert!(!client.contains("forex"));
    }

    #[tokio::test]
    async fn test_register_overwrites() {
        let client = MarketClient::new();
        let first = Arc::new(MockProvider::succeeding(dec!(1)));
        let second = Arc::new(MockProvider::succeeding(dec!(2)));
        client.register("crypto", first.clone());
        client.register("crypto", second.clone());

        let q = client
            .fetch(&FetchContext::new(), "crypto", "bitcoin")
            .await
            .unwrap();

        assert_eq!(q.price, dec!(2));
        assert_eq!(first.calls(), 0);
        assert_eq!(client.providers().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_errors_returned_verbatim() {
        let client = MarketClient::new();
        client.register(
            "stock",
            Arc::new(MockProvider::new(|_, symbol| {
                Err(MarketDataError::SymbolNotFound {
                    provider: "mock".to_string(),
                    symbol: symbol.to_string(),
                })
            })),
        );

        let err = client
            .fetch(&FetchContext::new(), "stock", "NOPE")
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::SymbolNotFound { ref symbol, .. } if symbol == "NOPE"));
    }
}
