use std::time::Duration;

use markets_sdk::{CoinGeckoProvider, FetchContext, MarketDataError, QuoteProvider};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn fetches_price_change_and_volume() {
    let server = server_with(ResponseTemplate::new(200).set_body_json(json!({
        "bitcoin": {
            "usd": 64000.0,
            "usd_24h_change": 2.5,
            "usd_24h_vol": 1000000000.0
        }
    })))
    .await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());

    let quote = provider
        .fetch(&FetchContext::new(), "Bitcoin")
        .await
        .unwrap();

    assert_eq!(quote.symbol, "Bitcoin");
    assert_eq!(quote.source, "coingecko");
    assert_eq!(quote.price, dec!(64000));
    assert_eq!(quote.change_24h, dec!(2.5));
    assert_eq!(quote.volume, dec!(1000000000));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or_default();
    assert!(query.contains("ids=bitcoin"), "{query}");
    assert!(query.contains("include_24hr_change=true"), "{query}");
}

#[tokio::test]
async fn missing_optional_fields_default_to_zero() {
    let server = server_with(
        ResponseTemplate::new(200).set_body_json(json!({ "ethereum": { "usd": 3000.0 } })),
    )
    .await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());

    let quote = provider
        .fetch(&FetchContext::new(), "ethereum")
        .await
        .unwrap();

    assert_eq!(quote.price, dec!(3000));
    assert_eq!(quote.change_24h, dec!(0));
    assert_eq!(quote.volume, dec!(0));
}

#[tokio::test]
async fn unknown_coin_is_symbol_not_found() {
    let server = server_with(ResponseTemplate::new(200).set_body_json(json!({}))).await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());

    let err = provider
        .fetch(&FetchContext::new(), "notacoin")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MarketDataError::SymbolNotFound { ref provider, ref symbol }
            if provider == "coingecko" && symbol == "notacoin"
    ));
}

#[tokio::test]
async fn non_ok_status_is_provider_error() {
    let server = server_with(ResponseTemplate::new(429)).await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());

    let err = provider
        .fetch(&FetchContext::new(), "bitcoin")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "coingecko: unexpected status code: 429");
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = server_with(ResponseTemplate::new(200).set_body_string("not json")).await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());

    let err = provider
        .fetch(&FetchContext::new(), "bitcoin")
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("failed to decode json"), "{message}");
    assert!(message.contains("body: not json"), "{message}");
}

#[tokio::test]
async fn slow_upstream_hits_deadline() {
    let server = server_with(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "bitcoin": { "usd": 1.0 } }))
            .set_delay(Duration::from_secs(5)),
    )
    .await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());
    let ctx = FetchContext::new().with_timeout(Duration::from_millis(100));

    let err = provider.fetch(&ctx, "bitcoin").await.unwrap_err();

    assert!(matches!(err, MarketDataError::DeadlineExceeded));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let padding = "x".repeat(2 * 1024 * 1024);
    let body = format!(r#"{{"bitcoin":{{"usd":1.0}},"pad":"{padding}"}}"#);
    let server = server_with(ResponseTemplate::new(200).set_body_string(body)).await;
    let provider = CoinGeckoProvider::with_base_url(server.uri());

    let err = provider
        .fetch(&FetchContext::new(), "bitcoin")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "coingecko: response body exceeds 1048576 bytes"
    );
}
