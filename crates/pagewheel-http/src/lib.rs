// # HTTP Fetcher
//
// This crate provides a reqwest-backed `Fetcher` for pagewheel.
//
// ## Purpose
//
// The sitemap resolver only knows the abstract `Fetcher` trait. This crate
// supplies the real network implementation used by `pagewheeld`.
//
// ## Behavior
//
// - One GET per call, no retries (the resolver's fallback chain is the retry)
// - Any completed exchange is `Ok`, whatever its status
// - Connect, timeout and body-read failures are `Error::Fetch`

use pagewheel_core::config::ResolverConfig;
use pagewheel_core::traits::{FetchResponse, Fetcher};
use pagewheel_core::{Error, Result};

use std::time::Duration;

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("pagewheel/", env!("CARGO_PKG_VERSION"));

/// HTTP-based fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client
    client: reqwest::Client,

    /// Per-request timeout
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Create from resolver configuration
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        Self::with_timeout(Duration::from_secs(config.fetch_timeout_secs))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse> {
        tracing::debug!("GET {}", uri);

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Request to {} failed: {}", uri, e)))?;

        let status = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response from {}: {}", uri, e)))?;

        tracing::debug!("{} answered {} ({} bytes)", uri, status, body.len());
        Ok(FetchResponse { status, body })
    }
}
