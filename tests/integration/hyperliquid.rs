//! Hyperliquid REST client and provider against a mock server

use crate::test_utils::{candle_payload, double_bottom_rows, mock_all_mids, mock_candles, provider, rest_client};
use chrono::{Duration as ChronoDuration, Utc};
use levelwatch::models::bar::unix_day;
use levelwatch::services::{MarketDataProvider, ProviderError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_daily_bars_decodes_candles() {
    let server = MockServer::start().await;
    mock_candles(&server, candle_payload(&double_bottom_rows())).await;

    let end = Utc::now();
    let bars = provider(&server, 0)
        .get_daily_bars("BTC", end - ChronoDuration::days(365), end)
        .await
        .unwrap();

    assert_eq!(bars.len(), 200);
    assert_eq!(bars.last().unwrap().time, unix_day(end));
    assert_eq!(bars[61].low, 99.2);
    assert_eq!(bars[61].close, 99.5);
    assert_eq!(bars[0].high, 111.0);
    assert_eq!(bars[0].volume, Some(1500.5));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("\"candleSnapshot\""));
    assert!(body.contains("\"1d\""));
    assert!(body.contains("\"BTC\""));
}

#[tokio::test]
async fn test_malformed_candles_are_skipped() {
    let server = MockServer::start().await;
    let mut payload = candle_payload(&[(11.0, 9.0, 10.0), (12.0, 10.0, 11.0)]);
    payload[0]["c"] = json!("not-a-number");
    mock_candles(&server, payload).await;

    let end = Utc::now();
    let bars = provider(&server, 0)
        .get_daily_bars("BTC", end - ChronoDuration::days(10), end)
        .await
        .unwrap();

    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].close, 11.0);
}

#[tokio::test]
async fn test_latest_price_from_all_mids() {
    let server = MockServer::start().await;
    mock_all_mids(&server, json!({ "BTC": "108.5", "ETH": "3500.0" })).await;

    let price = provider(&server, 0).get_latest_price("BTC").await.unwrap();
    assert_eq!(price, 108.5);
}

#[tokio::test]
async fn test_missing_coin_is_price_unavailable() {
    let server = MockServer::start().await;
    mock_all_mids(&server, json!({ "ETH": "3500.0" })).await;

    let result = provider(&server, 0).get_latest_price("BTC").await;
    assert!(matches!(
        result,
        Err(ProviderError::PriceUnavailable { ref symbol }) if symbol == "BTC"
    ));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .expect(2)
        .mount(&server)
        .await;

    let result = rest_client(&server, 1).all_mids().await;
    assert!(matches!(
        result,
        Err(ProviderError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let result = rest_client(&server, 3).all_mids().await;
    match result {
        Err(ProviderError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad request");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = rest_client(&server, 0).all_mids().await;
    assert!(matches!(result, Err(ProviderError::Decode(_))));
}
