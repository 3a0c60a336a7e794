//! Upstream dispatch fetching.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::GatewayError;

/// Fetches raw dispatch payloads from an upstream server.
///
/// The resolver only depends on this trait, so tests can substitute a
/// canned fetcher and count how often the network would be hit.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, GatewayError>;
}

/// Production fetcher backed by a shared HTTP client.
pub struct HttpManifestFetcher {
    client: reqwest::Client,
}

impl HttpManifestFetcher {
    pub fn new() -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Internal(format!("build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, GatewayError> {
        debug!("Fetching upstream dispatch from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Fetch(format!("upstream returned {status}")));
        }
        response
            .text()
            .await
            .map_err(|e| GatewayError::Fetch(e.to_string()))
    }
}
