//! Mocked Hyperliquid REST endpoints

use chrono::Utc;
use levelwatch::models::bar::{unix_day, SECONDS_PER_DAY};
use levelwatch::services::hyperliquid::{HyperliquidMarketDataProvider, HyperliquidRestClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `(high, low, close)` for 200 daily candles ending today: closes at 110
/// with two dips through 100 at bars 60 and 140.
pub fn double_bottom_rows() -> Vec<(f64, f64, f64)> {
    let dip = [
        (110.0, 104.0, 105.0),
        (105.0, 99.2, 99.5),
        (102.0, 99.3, 101.0),
        (107.0, 100.5, 106.0),
    ];
    (0..200)
        .map(|i| match i {
            60..=63 => dip[i - 60],
            140..=143 => dip[i - 140],
            _ => (111.0, 109.0, 110.0),
        })
        .collect()
}

/// Hyperliquid `candleSnapshot` payload for the given rows.
pub fn candle_payload(rows: &[(f64, f64, f64)]) -> Value {
    let first = unix_day(Utc::now()) - rows.len() as i64 + 1;
    let day_ms = SECONDS_PER_DAY * 1000;
    let candles: Vec<Value> = rows
        .iter()
        .enumerate()
        .map(|(i, (high, low, close))| {
            let open_time = (first + i as i64) * day_ms;
            json!({
                "t": open_time,
                "T": open_time + day_ms - 1,
                "s": "BTC",
                "i": "1d",
                "o": close.to_string(),
                "h": high.to_string(),
                "l": low.to_string(),
                "c": close.to_string(),
                "v": "1500.5",
                "n": 42
            })
        })
        .collect();
    Value::Array(candles)
}

pub async fn mock_candles(server: &MockServer, payload: Value) {
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_string_contains("candleSnapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(server)
        .await;
}

pub async fn mock_all_mids(server: &MockServer, mids: Value) {
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_string_contains("allMids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mids))
        .mount(server)
        .await;
}

pub fn rest_client(server: &MockServer, retries: usize) -> HyperliquidRestClient {
    HyperliquidRestClient::with_client(server.uri(), reqwest::Client::new())
        .with_retries(retries)
        .with_retry_delay(Duration::from_millis(1))
}

pub fn provider(server: &MockServer, retries: usize) -> Arc<HyperliquidMarketDataProvider> {
    Arc::new(HyperliquidMarketDataProvider::new(Arc::new(rest_client(
        server, retries,
    ))))
}
