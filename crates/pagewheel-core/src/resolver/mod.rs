//! Sitemap resolution
//!
//! The [`SitemapResolver`] turns an index document address into an
//! [`AddressList`]. It never fails: every path ends in a usable,
//! non-empty list.
//!
//! ## Fallback Chain
//!
//! ```text
//! index URI ──▶ strategy 1 ──fail──▶ strategy 2 ──fail──▶ ... ──fail──┐
//!                  │ body              │ body                        │
//!                  ▼                   ▼                             │
//!            extract <loc> ──zero──────────────────────────────────▶ origin ──invalid──▶ demo set
//!                  │ ≥ 1                                             │ ok
//!                  ▼                                                 ▼
//!          [locations] (stage tag)                   [origin] (domain-fallback)
//! ```
//!
//! Stages run strictly one after another; stage N+1 starts only after
//! stage N's failure is observed.

pub mod index;
pub mod strategy;

pub use strategy::{DirectRetrieval, RelayRetrieval, RetrievalStrategy, build_strategies};

use crate::config::ResolverConfig;
use crate::parser::AddressList;
use crate::traits::Fetcher;

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Which resolution stage produced the final list
///
/// Informational only; nothing downstream branches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Locations extracted from a document supplied by the tagged strategy
    Retrieved(String),
    /// Single-element list holding the index address's origin
    DomainFallback,
    /// The fixed demo set
    DemoFallback,
}

impl Provenance {
    /// The tag as reported to operators
    pub fn tag(&self) -> &str {
        match self {
            Provenance::Retrieved(tag) => tag,
            Provenance::DomainFallback => "domain-fallback",
            Provenance::DemoFallback => "demo-fallback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Outcome of a resolution; the list is never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    addresses: AddressList,
    provenance: Provenance,
}

impl Resolution {
    pub fn addresses(&self) -> &AddressList {
        &self.addresses
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn into_addresses(self) -> AddressList {
        self.addresses
    }
}

/// Resolves index documents into address lists
pub struct SitemapResolver {
    strategies: Vec<Box<dyn RetrievalStrategy>>,
    demo_fallback: AddressList,
}

impl SitemapResolver {
    /// Create a resolver from an explicit strategy chain
    ///
    /// # Parameters
    ///
    /// - `strategies`: Retrieval stages, tried in order
    /// - `demo_fallback`: Returned when the index address is not a valid URI;
    ///   must be non-empty (see [`ResolverConfig::validate`])
    pub fn new(strategies: Vec<Box<dyn RetrievalStrategy>>, demo_fallback: AddressList) -> Self {
        Self {
            strategies,
            demo_fallback,
        }
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &ResolverConfig, fetcher: Arc<dyn Fetcher>) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::new(
            build_strategies(&config.strategies, fetcher),
            AddressList::new(config.demo_fallback.clone()),
        ))
    }

    /// Resolve an index address into a non-empty address list
    ///
    /// This never fails. Retrieval and parse failures fold into the
    /// fallback chain described in the module docs.
    pub async fn resolve(&self, index_uri: &str) -> Resolution {
        let index_uri = index_uri.trim();

        let parsed = match Url::parse(index_uri) {
            Ok(url) => url,
            Err(e) => {
                warn!("Index address '{}' is not a valid URI ({}), using demo set", index_uri, e);
                return self.demo();
            }
        };

        if let Some(resolution) = self.retrieve_and_extract(index_uri).await {
            return resolution;
        }

        match index::origin_of(&parsed) {
            Some(origin) => {
                info!("Falling back to origin {} for {}", origin, index_uri);
                Resolution {
                    addresses: AddressList::new(vec![origin]),
                    provenance: Provenance::DomainFallback,
                }
            }
            None => {
                warn!("No origin for '{}', using demo set", index_uri);
                self.demo()
            }
        }
    }

    /// Run the strategy chain and extract locations from the first body
    async fn retrieve_and_extract(&self, index_uri: &str) -> Option<Resolution> {
        for strategy in &self.strategies {
            let body = match strategy.attempt(index_uri).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Retrieval stage '{}' failed: {}", strategy.tag(), e);
                    continue;
                }
            };

            debug!("Stage '{}' returned {} bytes", strategy.tag(), body.len());
            let locations = index::extract_locations(&body);
            if locations.is_empty() {
                warn!("Index document from '{}' listed no addresses", strategy.tag());
                return None;
            }

            info!(
                "Resolved {} address(es) from {} via '{}'",
                locations.len(),
                index_uri,
                strategy.tag()
            );
            return Some(Resolution {
                addresses: AddressList::new(locations),
                provenance: Provenance::Retrieved(strategy.tag().to_string()),
            });
        }

        warn!("All retrieval stages failed for {}", index_uri);
        None
    }

    fn demo(&self) -> Resolution {
        Resolution {
            addresses: self.demo_fallback.clone(),
            provenance: Provenance::DemoFallback,
        }
    }
}
