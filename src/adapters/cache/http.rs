//! HTTP-backed permission cache client
//!
//! Fetches the permission configuration document over HTTP from the cache's
//! read endpoint. A stalled cache must not block unrelated file invocations,
//! so the client uses short connect/read timeouts and a small bounded retry
//! count with jittered exponential backoff.

use crate::adapters::cache::traits::{PermissionCache, PermissionsConfig};
use crate::config::{CacheConfig, RetryConfig};
use crate::domain::{BatchError, CacheError, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Key of the permission configuration document
const PERMISSIONS_CONFIG_KEY: &str = "permissions_config.json";

/// Permission cache client over HTTP
pub struct HttpPermissionCache {
    base_url: String,
    client: Client,
    retry: RetryConfig,
}

impl HttpPermissionCache {
    /// Create a new client from cache configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| {
                BatchError::Configuration(format!("Failed to build cache HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            client,
            retry: config.retry.clone(),
        })
    }

    /// Retry a request with jittered exponential backoff
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = self.retry.initial_delay_ms
                        * (self.retry.backoff_multiplier.powf((attempt - 1) as f64) as u64);
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);
                    // Jitter keeps concurrent invocations from retrying in lockstep
                    let jitter_ms = rand::thread_rng().gen_range(0..=delay_ms / 2 + 1);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms + jitter_ms,
                        error = %e,
                        "Retrying permission cache request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms)).await;
                }
            }
        }
    }

    async fn fetch_config(&self) -> Result<PermissionsConfig> {
        let url = format!("{}/{}", self.base_url, PERMISSIONS_CONFIG_KEY);

        self.retry_request(|| async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                if e.is_timeout() {
                    BatchError::Cache(CacheError::Timeout(e.to_string()))
                } else {
                    BatchError::Cache(CacheError::ConnectionFailed(e.to_string()))
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let error = if status.is_server_error() {
                    CacheError::ServerError {
                        status: status.as_u16(),
                        message: body,
                    }
                } else {
                    CacheError::ClientError {
                        status: status.as_u16(),
                        message: body,
                    }
                };
                return Err(BatchError::Cache(error));
            }

            response
                .json::<PermissionsConfig>()
                .await
                .map_err(|e| BatchError::Cache(CacheError::InvalidResponse(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl PermissionCache for HttpPermissionCache {
    async fn supplier_permissions(&self, supplier: &str) -> Result<Vec<String>> {
        let config = self.fetch_config().await?;
        Ok(config.supplier_permissions(supplier))
    }
}
