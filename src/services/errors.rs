//! Errors raised by market data sources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("no price available for {symbol}")]
    PriceUnavailable { symbol: String },
}

impl ProviderError {
    /// Worth retrying: connection problems, timeouts, rate limits and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Decode(_) | ProviderError::PriceUnavailable { .. } => false,
        }
    }
}
