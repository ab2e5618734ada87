//! Market data access: provider trait, Hyperliquid REST source and the
//! bar series cache.

pub mod cache;
pub mod errors;
pub mod hyperliquid;
pub mod market_data;

pub use cache::{BarSeriesCache, SeriesRead};
pub use errors::ProviderError;
pub use market_data::MarketDataProvider;
