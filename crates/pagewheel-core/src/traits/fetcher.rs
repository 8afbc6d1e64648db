// # Fetcher Trait
//
// Abstract document retrieval used by the sitemap resolver.
//
// ## Implementations
//
// - reqwest-backed: `pagewheel-http` crate
// - Tests: scripted in-memory fetchers

use async_trait::async_trait;

/// A completed retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Response status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FetchResponse {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for document retrieval
///
/// A `Fetcher` performs exactly one request per call. It reports
/// transport failures as `Err`, and any completed exchange (including
/// non-2xx statuses) as `Ok(FetchResponse)`. Deciding what counts as a
/// usable response is left to the caller.
///
/// Implementations must not retry; the resolver's fallback chain is the
/// only retry mechanism.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `uri` and return its status and body
    async fn fetch(&self, uri: &str) -> crate::Result<FetchResponse>;
}
