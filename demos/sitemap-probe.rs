// # Sitemap Probe
//
// Resolves one index document against the real network and prints what
// each retrieval stage would yield. Useful for checking that a site's
// sitemap is reachable before pointing pagewheeld at it.
//
// ## Usage
//
// ```bash
// PAGEWHEEL_SITEMAP_URL=https://www.rust-lang.org/sitemap.xml \
// cargo run --bin sitemap_probe
// ```
//
// ## Environment Variables
//
// Required:
// - `PAGEWHEEL_SITEMAP_URL`: Index document address
//
// Optional:
// - `PAGEWHEEL_FETCH_TIMEOUT_SECS`: Per-request timeout (default: 10)

use pagewheel_core::config::ResolverConfig;
use pagewheel_core::resolver::{RetrievalStrategy, build_strategies, index};
use pagewheel_core::{Fetcher, SitemapResolver};
use pagewheel_http::HttpFetcher;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("=== Sitemap Probe ===");

    let sitemap_url = env::var("PAGEWHEEL_SITEMAP_URL").unwrap_or_else(|_| {
        tracing::error!("PAGEWHEEL_SITEMAP_URL environment variable is required");
        std::process::exit(1);
    });

    let mut config = ResolverConfig::default();
    if let Ok(raw) = env::var("PAGEWHEEL_FETCH_TIMEOUT_SECS") {
        config.fetch_timeout_secs = raw.parse()?;
    }
    config.validate()?;

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config)?);

    // Try every stage, without stopping at the first success
    tracing::info!("Probing {} stage(s) for {}", config.strategies.len(), sitemap_url);
    for strategy in build_strategies(&config.strategies, fetcher.clone()) {
        match strategy.attempt(&sitemap_url).await {
            Ok(body) => {
                let locations = index::extract_locations(&body);
                tracing::info!(
                    "✓ {}: {} bytes, {} location(s)",
                    strategy.tag(),
                    body.len(),
                    locations.len()
                );
                for location in locations.iter().take(5) {
                    tracing::info!("    {}", location);
                }
            }
            Err(e) => tracing::warn!("✗ {}: {}", strategy.tag(), e),
        }
    }

    // What the resolver would actually hand to the scheduler
    let resolver = SitemapResolver::from_config(&config, fetcher)?;
    let resolution = resolver.resolve(&sitemap_url).await;
    tracing::info!(
        "Resolution: {} address(es) via {}",
        resolution.addresses().len(),
        resolution.provenance()
    );

    tracing::info!("=== Probe Complete ===");
    Ok(())
}
