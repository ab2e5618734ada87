//! Single-slot cache of the daily bar series for the configured instrument.
//!
//! The entry is swapped wholesale behind an `RwLock`, so readers never see a
//! half-written series. Refreshes are serialized by a separate mutex and
//! re-check freshness once they hold it, which collapses a burst of
//! concurrent misses into one upstream fetch.

use crate::error::LevelError;
use crate::models::bar::{unix_day, Bar};
use crate::services::market_data::MarketDataProvider;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct CacheEntry {
    pub series: Arc<[Bar]>,
    pub fetched_at: DateTime<Utc>,
}

/// A series handed out by the cache.
#[derive(Debug, Clone)]
pub struct SeriesRead {
    pub series: Arc<[Bar]>,
    pub fetched_at: DateTime<Utc>,
    /// The refresh failed and an expired entry was served instead.
    pub stale: bool,
}

impl SeriesRead {
    fn from_entry(entry: &CacheEntry, stale: bool) -> Self {
        Self {
            series: entry.series.clone(),
            fetched_at: entry.fetched_at,
            stale,
        }
    }
}

pub struct BarSeriesCache {
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
    symbol: String,
    entry: RwLock<Option<Arc<CacheEntry>>>,
    refresh_guard: Mutex<()>,
}

impl BarSeriesCache {
    pub fn new(provider: Arc<dyn MarketDataProvider + Send + Sync>, symbol: impl Into<String>) -> Self {
        Self {
            provider,
            symbol: symbol.into(),
            entry: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Return the cached series if younger than `max_age`, otherwise refetch
    /// `lookback_days` of history ending now. A failed refetch falls back to
    /// the existing entry (flagged stale) and only errors when nothing has
    /// ever been cached.
    pub async fn get_series(
        &self,
        max_age: Duration,
        lookback_days: u32,
    ) -> Result<SeriesRead, LevelError> {
        if let Some(entry) = self.fresh_entry(max_age).await {
            return Ok(SeriesRead::from_entry(&entry, false));
        }

        let _guard = self.refresh_guard.lock().await;
        if let Some(entry) = self.fresh_entry(max_age).await {
            debug!(symbol = %self.symbol, "series refreshed by a concurrent caller");
            return Ok(SeriesRead::from_entry(&entry, false));
        }

        let now = Utc::now();
        let start = now - chrono::Duration::days(i64::from(lookback_days));

        match self.provider.get_daily_bars(&self.symbol, start, now).await {
            Ok(raw) => {
                let raw_count = raw.len();
                let series = normalize_series(raw, unix_day(start), unix_day(now));
                info!(
                    symbol = %self.symbol,
                    fetched = raw_count,
                    kept = series.len(),
                    lookback_days = lookback_days,
                    "bar series refreshed for {}",
                    self.symbol
                );
                let entry = Arc::new(CacheEntry {
                    series: series.into(),
                    fetched_at: now,
                });
                *self.entry.write().await = Some(entry.clone());
                Ok(SeriesRead::from_entry(&entry, false))
            }
            Err(e) => {
                let cached = self.entry.read().await.clone();
                match cached {
                    Some(entry) => {
                        warn!(
                            symbol = %self.symbol,
                            error = %e,
                            fetched_at = %entry.fetched_at,
                            "bar series refresh failed, serving stale entry"
                        );
                        Ok(SeriesRead::from_entry(&entry, true))
                    }
                    None => Err(LevelError::DataUnavailable {
                        symbol: self.symbol.clone(),
                        source: e,
                    }),
                }
            }
        }
    }

    /// Current entry regardless of age; never touches the network.
    pub async fn snapshot(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().await.clone()
    }

    async fn fresh_entry(&self, max_age: Duration) -> Option<Arc<CacheEntry>> {
        let entry = self.entry.read().await.clone()?;
        // A negative age (clock stepped back) counts as brand new.
        let age = (Utc::now() - entry.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        (age < max_age).then_some(entry)
    }
}

/// Drop insane bars, then duplicate days (the first valid occurrence wins),
/// keep days in `[start_day, end_day]`, order oldest-first.
pub fn normalize_series(raw: Vec<Bar>, start_day: i64, end_day: i64) -> Vec<Bar> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut rejected = 0usize;

    let mut series: Vec<Bar> = raw
        .into_iter()
        .filter(|bar| {
            let sane = bar.is_sane();
            if !sane {
                rejected += 1;
            }
            sane
        })
        .filter(|bar| seen.insert(bar.time))
        .filter(|bar| bar.time >= start_day && bar.time <= end_day)
        .collect();
    series.sort_by_key(|bar| bar.time);

    if rejected > 0 {
        warn!(rejected = rejected, "dropped bars violating low <= close <= high");
    }
    series
}
