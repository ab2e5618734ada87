//! Request and response payloads of the Hyperliquid `/info` endpoint.

use crate::models::bar::{Bar, SECONDS_PER_DAY};
use crate::services::errors::ProviderError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InfoRequest {
    CandleSnapshot { req: CandleSnapshotRequest },
    AllMids,
}

impl InfoRequest {
    pub fn candle_snapshot(coin: &str, interval: &str, start_time: i64, end_time: i64) -> Self {
        InfoRequest::CandleSnapshot {
            req: CandleSnapshotRequest {
                coin: coin.to_string(),
                interval: interval.to_string(),
                start_time,
                end_time,
            },
        }
    }
}

/// Times are epoch milliseconds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSnapshotRequest {
    pub coin: String,
    pub interval: String,
    pub start_time: i64,
    pub end_time: i64,
}

/// One candle as returned by `candleSnapshot`; prices arrive as strings.
/// Fields the pipeline never reads (open, close time, trade count) are left
/// to serde's unknown-field skipping.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotCandle {
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "v", default)]
    pub volume: Option<String>,
}

impl TryFrom<&SnapshotCandle> for Bar {
    type Error = ProviderError;

    fn try_from(candle: &SnapshotCandle) -> Result<Self, Self::Error> {
        let bar = Bar::new(
            candle.open_time.div_euclid(SECONDS_PER_DAY * 1000),
            parse_price("high", &candle.high)?,
            parse_price("low", &candle.low)?,
            parse_price("close", &candle.close)?,
        );
        match &candle.volume {
            Some(volume) => Ok(bar.with_volume(parse_price("volume", volume)?)),
            None => Ok(bar),
        }
    }
}

pub(crate) fn parse_price(field: &str, raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ProviderError::Decode(format!("invalid {field} '{raw}': {e}")))
}
