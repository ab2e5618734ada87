//! Hyperliquid market data provider implementation

use super::messages::parse_price;
use super::rest::HyperliquidRestClient;
use crate::config::Config;
use crate::models::Bar;
use crate::services::errors::ProviderError;
use crate::services::market_data::MarketDataProvider;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DAILY_INTERVAL: &str = "1d";

pub struct HyperliquidMarketDataProvider {
    rest: Arc<HyperliquidRestClient>,
    interval: String,
}

impl HyperliquidMarketDataProvider {
    pub fn new(rest: Arc<HyperliquidRestClient>) -> Self {
        Self {
            rest,
            interval: DAILY_INTERVAL.to_string(),
        }
    }

    /// Provider built from runtime configuration (URL, timeout, retries).
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let rest = HyperliquidRestClient::new(&config.hyperliquid_url, config.http_timeout)?
            .with_retries(config.fetch_retries);
        Ok(Self::new(Arc::new(rest)))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for HyperliquidMarketDataProvider {
    async fn get_daily_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ProviderError> {
        let candles = self
            .rest
            .candle_snapshot(
                symbol,
                &self.interval,
                start.timestamp_millis(),
                end.timestamp_millis(),
            )
            .await?;

        debug!(
            symbol = %symbol,
            count = candles.len(),
            "candleSnapshot returned {} candles for {}",
            candles.len(),
            symbol
        );

        let mut bars = Vec::with_capacity(candles.len());
        for candle in &candles {
            match Bar::try_from(candle) {
                Ok(bar) => bars.push(bar),
                Err(e) => {
                    warn!(symbol = %symbol, open_time = candle.open_time, error = %e, "skipping malformed candle");
                }
            }
        }
        Ok(bars)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, ProviderError> {
        let mids = self.rest.all_mids().await?;
        let raw = mids
            .get(symbol)
            .ok_or_else(|| ProviderError::PriceUnavailable {
                symbol: symbol.to_string(),
            })?;
        let price = parse_price("mid", raw)?;
        if price.is_finite() && price > 0.0 {
            Ok(price)
        } else {
            Err(ProviderError::PriceUnavailable {
                symbol: symbol.to_string(),
            })
        }
    }
}
