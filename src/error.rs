//! Pipeline error type.

use crate::services::errors::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    /// No series could be obtained, neither fresh nor cached.
    #[error("no price history available for {symbol}: {source}")]
    DataUnavailable {
        symbol: String,
        #[source]
        source: ProviderError,
    },

    #[error("price must be finite and strictly positive, got {0}")]
    InvalidPrice(f64),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Rejects zero, negative and non-finite prices at the pipeline boundary.
pub fn ensure_positive_price(price: f64) -> Result<f64, LevelError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(LevelError::InvalidPrice(price))
    }
}
