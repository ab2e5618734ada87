//! Hyperliquid REST market data source.

pub mod messages;
pub mod provider;
pub mod rest;

pub use provider::HyperliquidMarketDataProvider;
pub use rest::HyperliquidRestClient;
