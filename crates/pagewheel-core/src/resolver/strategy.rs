// # Retrieval Strategies
//
// One stage of the sitemap retrieval chain. Each strategy turns an index
// address into document text or a failure; the resolver tries them in
// order and stops at the first body.
//
// - `DirectRetrieval`: fetch the address as-is
// - `RelayRetrieval`: fetch through an intermediary that proxies arbitrary URLs

use crate::config::{RELAY_URL_PLACEHOLDER, StrategyConfig};
use crate::error::{Error, Result};
use crate::traits::{FetchResponse, Fetcher};

use async_trait::async_trait;
use std::sync::Arc;

/// A single retrieval stage
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Provenance tag reported when this stage supplies the document
    fn tag(&self) -> &str;

    /// Attempt to retrieve the document at `uri`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: A non-empty body from a 2xx response
    /// - `Err(Error)`: Transport failure, non-2xx status, or empty body
    async fn attempt(&self, uri: &str) -> Result<String>;
}

/// Accept a response only if it is 2xx with a non-blank body
fn usable_body(response: FetchResponse, uri: &str) -> Result<String> {
    if !response.is_success() {
        return Err(Error::http(response.status, uri));
    }
    if response.body.trim().is_empty() {
        return Err(Error::fetch(format!("Empty body from {}", uri)));
    }
    Ok(response.body)
}

/// Fetch the index address directly
pub struct DirectRetrieval {
    tag: String,
    fetcher: Arc<dyn Fetcher>,
}

impl DirectRetrieval {
    pub fn new(tag: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            tag: tag.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl RetrievalStrategy for DirectRetrieval {
    fn tag(&self) -> &str {
        &self.tag
    }

    async fn attempt(&self, uri: &str) -> Result<String> {
        let response = self.fetcher.fetch(uri).await?;
        usable_body(response, uri)
    }
}

/// Fetch the index address through a relay service
///
/// The target is percent-encoded and substituted for `{url}` in the
/// template, e.g. `https://relay.example/raw?url={url}`.
pub struct RelayRetrieval {
    tag: String,
    template: String,
    fetcher: Arc<dyn Fetcher>,
}

impl RelayRetrieval {
    pub fn new(tag: impl Into<String>, template: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            tag: tag.into(),
            template: template.into(),
            fetcher,
        }
    }

    /// Build the relay URI for a target address
    pub fn relay_uri(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        self.template.replace(RELAY_URL_PLACEHOLDER, &encoded)
    }
}

#[async_trait]
impl RetrievalStrategy for RelayRetrieval {
    fn tag(&self) -> &str {
        &self.tag
    }

    async fn attempt(&self, uri: &str) -> Result<String> {
        let relay_uri = self.relay_uri(uri);
        let response = self.fetcher.fetch(&relay_uri).await?;
        usable_body(response, &relay_uri)
    }
}

/// Build the strategy chain described by configuration
pub fn build_strategies(
    configs: &[StrategyConfig],
    fetcher: Arc<dyn Fetcher>,
) -> Vec<Box<dyn RetrievalStrategy>> {
    configs
        .iter()
        .map(|config| -> Box<dyn RetrievalStrategy> {
            match config {
                StrategyConfig::Direct { tag } => {
                    Box::new(DirectRetrieval::new(tag.clone(), fetcher.clone()))
                }
                StrategyConfig::Relay { tag, template } => Box::new(RelayRetrieval::new(
                    tag.clone(),
                    template.clone(),
                    fetcher.clone(),
                )),
            }
        })
        .collect()
}
