//! Pipeline composition: cache → validator → calibrator → detector →
//! post-processor → similarity.

use crate::config::Config;
use crate::error::{ensure_positive_price, LevelError};
use crate::levels::{calibrate, detect_series, post_process, score, validate};
use crate::models::{Bar, LevelReport};
use crate::services::cache::BarSeriesCache;
use crate::services::market_data::MarketDataProvider;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct LevelEngine {
    cache: Arc<BarSeriesCache>,
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
    config: Config,
}

impl LevelEngine {
    pub fn new(
        cache: Arc<BarSeriesCache>,
        provider: Arc<dyn MarketDataProvider + Send + Sync>,
        config: Config,
    ) -> Self {
        Self {
            cache,
            provider,
            config,
        }
    }

    /// Latest price from the data source, falling back to the last cached
    /// close when the source cannot answer.
    pub async fn current_price(&self) -> Result<f64, LevelError> {
        let symbol = self.cache.symbol();
        match self.provider.get_latest_price(symbol).await {
            Ok(price) => Ok(price),
            Err(e) => {
                let last_close = self
                    .cache
                    .snapshot()
                    .await
                    .and_then(|entry| entry.series.last().map(|bar| bar.close));
                match last_close {
                    Some(close) => {
                        warn!(symbol = %symbol, error = %e, close = close, "price fetch failed, using last cached close");
                        Ok(close)
                    }
                    None => Err(LevelError::Provider(e)),
                }
            }
        }
    }

    /// Run the whole pipeline for `current_price` on the cached series.
    pub async fn run(&self, current_price: f64) -> Result<LevelReport, LevelError> {
        let price = ensure_positive_price(current_price)?;
        let start = Instant::now();

        let read = self
            .cache
            .get_series(self.config.cache_max_age, self.config.lookback_days)
            .await?;
        let mut report = self.evaluate(price, &read.series)?;
        report.stale = read.stale;

        info!(
            symbol = %report.symbol,
            price = price,
            levels = report.levels.len(),
            validated = report.validated.len(),
            similarity = report.similarity,
            stale = report.stale,
            duration_ms = start.elapsed().as_millis() as u64,
            "level pipeline finished for {}",
            report.symbol
        );
        Ok(report)
    }

    /// The synchronous part of the pipeline over an already fetched series.
    pub fn evaluate(&self, current_price: f64, series: &[Bar]) -> Result<LevelReport, LevelError> {
        let price = ensure_positive_price(current_price)?;
        let policy = &self.config.policy;
        let predefined = &self.config.predefined_levels;

        let validated = validate(predefined, series, policy);
        let prominence = calibrate(&validated, series, policy);
        debug!(
            validated = validated.len(),
            prominence = prominence,
            "calibrated prominence from {} validated levels",
            validated.len()
        );

        let mut report = LevelReport::new(self.cache.symbol().to_string(), price);
        report.bar_count = series.len();
        report.prominence = prominence;

        if series.len() < policy.min_bars() {
            info!(
                bars = series.len(),
                required = policy.min_bars(),
                "not enough bars for level detection ({} < {})",
                series.len(),
                policy.min_bars()
            );
            report.insufficient_data = true;
            return Ok(report.with_validated(validated));
        }

        let raw = detect_series(series, self.config.detection_mode, prominence, policy);
        debug!(
            supports = raw.supports.len(),
            resistances = raw.resistances.len(),
            mode = ?self.config.detection_mode,
            "raw extrema detected"
        );

        let set = post_process(
            &raw.supports,
            &raw.resistances,
            price,
            series,
            predefined,
            self.config.options,
            policy,
        )?;
        report.similarity = score(&set.levels, &validated, policy);

        Ok(report.with_level_set(set).with_validated(validated))
    }
}
