//! Market data provider interface.

use crate::models::Bar;
use crate::services::errors::ProviderError;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait MarketDataProvider {
    /// Daily bars covering `[start, end]`. Ordering and uniqueness are not
    /// guaranteed; the cache normalizes whatever comes back.
    async fn get_daily_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ProviderError>;

    /// Latest traded (mid) price for a symbol.
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, ProviderError>;
}
