//! Thin REST client for the Hyperliquid `/info` endpoint.

use super::messages::{InfoRequest, SnapshotCandle};
use crate::services::errors::ProviderError;
use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HyperliquidRestClient {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay: Duration,
}

impl HyperliquidRestClient {
    /// Client with its own connection pool and a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Extra attempts after the first failed one (transient errors only).
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn candle_snapshot(
        &self,
        coin: &str,
        interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<SnapshotCandle>, ProviderError> {
        let request = InfoRequest::candle_snapshot(coin, interval, start_ms, end_ms);
        self.post_info(&request).await
    }

    /// Mid prices keyed by coin.
    pub async fn all_mids(&self) -> Result<HashMap<String, String>, ProviderError> {
        self.post_info(&InfoRequest::AllMids).await
    }

    async fn post_info<T: DeserializeOwned>(&self, request: &InfoRequest) -> Result<T, ProviderError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry_delay)
            .with_max_times(self.retries);

        (|| self.post_info_once::<T>(request))
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(ProviderError::is_transient)
            .notify(|err: &ProviderError, delay: Duration| {
                warn!(
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Hyperliquid request failed, retrying"
                );
            })
            .await
    }

    async fn post_info_once<T: DeserializeOwned>(
        &self,
        request: &InfoRequest,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/info", self.base_url);
        debug!(url = %url, request = ?request, "POST /info");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
