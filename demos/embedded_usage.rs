//! Minimal embedding example for pagewheel-core
//!
//! This example demonstrates using pagewheel-core as a library in a custom application.
//! The scheduler lifecycle is fully managed by the application.

use pagewheel_core::config::{ResolverConfig, SchedulerConfig, StrategyConfig};
use pagewheel_core::{
    Display, FetchResponse, Fetcher, Result, RotationScheduler, SitemapResolver, parser,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

const INDEX: &str = "https://embedded.example/sitemap.xml";

/// Custom display that prints to stdout
struct ConsoleDisplay {
    shows: Arc<AtomicUsize>,
}

impl ConsoleDisplay {
    fn new() -> Self {
        Self {
            shows: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl Display for ConsoleDisplay {
    async fn show(&self, address: &str) {
        let n = self.shows.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[Embedded] #{} {}", n, address);
    }

    async fn clear(&self) {
        println!("[Embedded] (blank)");
    }
}

/// Fetcher serving a canned sitemap, standing in for the network
struct InMemoryFetcher;

#[async_trait::async_trait]
impl Fetcher for InMemoryFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse> {
        if uri == INDEX {
            Ok(FetchResponse::new(
                200,
                r#"<urlset>
                     <url><loc>https://embedded.example/</loc></url>
                     <url><loc>https://embedded.example/about</loc></url>
                     <url><loc>https://embedded.example/blog</loc></url>
                   </urlset>"#,
            ))
        } else {
            Ok(FetchResponse::new(404, ""))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded pagewheel-core Example ===\n");

    // Manual list, as an operator would type it
    println!("1. Parsing a manual list...");
    let manual = parser::parse("example.com\n# staging\n\nhttps://www.rust-lang.org\n");
    println!("   {} address(es): {:?}\n", manual.len(), manual.as_slice());

    // Sitemap list, through a custom fetcher
    println!("2. Resolving a sitemap...");
    let resolver_config = ResolverConfig {
        strategies: vec![StrategyConfig::direct("direct")],
        ..ResolverConfig::default()
    };
    let resolver = SitemapResolver::from_config(&resolver_config, Arc::new(InMemoryFetcher))?;
    let resolution = resolver.resolve(INDEX).await;
    println!(
        "   {} address(es) via {}\n",
        resolution.addresses().len(),
        resolution.provenance()
    );

    // Short dwell so the example finishes quickly
    let config = SchedulerConfig {
        event_channel_capacity: 100,
        ..SchedulerConfig::default().with_dwell_range(1.0, 2.0)
    };

    println!("3. Spawning scheduler...");
    let (scheduler, events) = RotationScheduler::spawn(Box::new(ConsoleDisplay::new()), config)?;

    let event_listener = tokio::spawn(async move {
        let mut events = ReceiverStream::new(events);
        while let Some(event) = events.next().await {
            println!("[Event] {}", event.status_line());
        }
    });

    println!("4. Starting rotation...\n");
    scheduler.start(resolution.into_addresses()).await?;

    // Application does other work while pages rotate
    tokio::time::sleep(tokio::time::Duration::from_secs(6)).await;

    println!("\n5. Stopping...");
    let pages = scheduler.stop().await?;
    scheduler.shutdown().await?;
    let _ = tokio::time::timeout(tokio::time::Duration::from_millis(100), event_listener).await;

    println!("\n=== Embedding Successful ===");
    println!("Pages viewed: {}", pages);
    println!("Key Points:");
    println!("- Scheduler lifecycle is fully controlled by application");
    println!("- Display and Fetcher are custom (not pagewheeld defaults)");

    Ok(())
}
