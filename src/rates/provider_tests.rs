//! Tests for the rate-provider chain.

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn provider(name: &str, url: String) -> RateProvider {
    RateProvider {
        name: name.to_string(),
        url,
    }
}

fn rates_body(aud: f64, jpy: f64) -> serde_json::Value {
    serde_json::json!({ "rates": { "AUD": aud, "JPY": jpy } })
}

// ── parse_quotes ─────────────────────────────────────────────────────

#[test]
fn parses_rates_shape() {
    let quotes = parse_quotes(&rates_body(1.52, 149.8)).unwrap();
    assert_eq!(quotes.aud, 1.52);
    assert_eq!(quotes.jpy, 149.8);
}

#[test]
fn parses_quotes_shape() {
    let body = serde_json::json!({ "quotes": { "USDAUD": 1.52, "USDJPY": 149.8 } });
    let quotes = parse_quotes(&body).unwrap();
    assert_eq!(quotes.aud, 1.52);
    assert_eq!(quotes.jpy, 149.8);
}

#[test]
fn parses_string_values() {
    let body = serde_json::json!({ "rates": { "AUD": "1.52", "JPY": "149.8" } });
    let quotes = parse_quotes(&body).unwrap();
    assert_eq!(quotes.aud, 1.52);
    assert_eq!(quotes.jpy, 149.8);
}

#[test]
fn partial_set_is_rejected_whole() {
    let body = serde_json::json!({ "rates": { "AUD": 1.52 } });
    assert!(parse_quotes(&body).is_none());
}

#[test]
fn non_positive_values_are_rejected() {
    assert!(parse_quotes(&rates_body(0.0, 149.8)).is_none());
    assert!(parse_quotes(&rates_body(1.52, -1.0)).is_none());
}

// ── fetch_rates ──────────────────────────────────────────────────────

#[tokio::test]
async fn first_working_provider_wins() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body(1.5, 150.0)))
        .mount(&first)
        .await;
    // The second provider must never be consulted.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body(9.9, 999.0)))
        .expect(0)
        .mount(&second)
        .await;

    let providers = vec![
        provider("first", first.uri()),
        provider("second", second.uri()),
    ];
    let quotes = fetch_rates(&reqwest::Client::new(), &providers)
        .await
        .unwrap();

    assert_eq!(quotes.aud, 1.5);
    assert_eq!(quotes.jpy, 150.0);
}

#[tokio::test]
async fn malformed_response_falls_through_to_next() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body(1.5, 150.0)))
        .mount(&second)
        .await;

    let providers = vec![
        provider("first", first.uri()),
        provider("second", second.uri()),
    ];
    let quotes = fetch_rates(&reqwest::Client::new(), &providers)
        .await
        .unwrap();

    assert_eq!(quotes.aud, 1.5);
}

#[tokio::test]
async fn partial_response_falls_through_to_next() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "rates": { "AUD": 1.5 } })),
        )
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body(1.6, 151.0)))
        .mount(&second)
        .await;

    let providers = vec![
        provider("first", first.uri()),
        provider("second", second.uri()),
    ];
    let quotes = fetch_rates(&reqwest::Client::new(), &providers)
        .await
        .unwrap();

    assert_eq!(quotes.aud, 1.6);
    assert_eq!(quotes.jpy, 151.0);
}

#[tokio::test]
async fn http_error_falls_through_to_next() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body(1.5, 150.0)))
        .mount(&second)
        .await;

    let providers = vec![
        provider("first", first.uri()),
        provider("second", second.uri()),
    ];
    let quotes = fetch_rates(&reqwest::Client::new(), &providers).await;

    assert!(quotes.is_some());
}

#[tokio::test]
async fn all_providers_exhausted_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let providers = vec![
        provider("only", server.uri()),
        provider("unreachable", "http://127.0.0.1:1/rates".to_string()),
    ];
    let quotes = fetch_rates(&reqwest::Client::new(), &providers).await;

    assert!(quotes.is_none());
}

#[tokio::test]
async fn no_providers_returns_none() {
    let quotes = fetch_rates(&reqwest::Client::new(), &[]).await;
    assert!(quotes.is_none());
}
