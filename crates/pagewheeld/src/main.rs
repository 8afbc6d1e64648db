// # pagewheeld - Page Rotation Daemon
//
// This is a THIN integration layer. All rotation and resolution logic
// lives in pagewheel-core; the daemon only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Builds the address list (manual text or sitemap)
// 4. Runs the scheduler until SIGINT/SIGTERM, then stops and reports
//
// ## Configuration
//
// ### Source
// - `PAGEWHEEL_SOURCE`: `manual` or `sitemap` (default: `sitemap` if a sitemap URL is set)
// - `PAGEWHEEL_ADDRESSES`: Addresses separated by newlines or commas (manual)
// - `PAGEWHEEL_ADDRESS_FILE`: File with one address per line, `#` comments allowed (manual)
// - `PAGEWHEEL_SITEMAP_URL`: Index document address (sitemap)
//
// ### Timing
// - `PAGEWHEEL_MIN_DWELL_SECS`: Lower dwell bound (default 5)
// - `PAGEWHEEL_MAX_DWELL_SECS`: Upper dwell bound (default 12)
//
// ### Other
// - `PAGEWHEEL_CONFIG_FILE`: JSON file with a full `PagewheelConfig`; env values override it
// - `PAGEWHEEL_FETCH_TIMEOUT_SECS`: Per-request timeout for sitemap retrieval
// - `PAGEWHEEL_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export PAGEWHEEL_SITEMAP_URL=https://news.example/sitemap.xml
// export PAGEWHEEL_MIN_DWELL_SECS=8
// export PAGEWHEEL_MAX_DWELL_SECS=20
//
// pagewheeld
// ```

use anyhow::Result;
use pagewheel_core::{
    AddressList, Display, PagewheelConfig, RotationScheduler, SchedulerEvent, parser,
};
use std::env;
use std::process::ExitCode;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or input error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum PagewheelExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or rejected operator input
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<PagewheelExitCode> for ExitCode {
    fn from(code: PagewheelExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Where the address list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Manual,
    Sitemap,
}

/// Application configuration
struct Config {
    source: Source,
    addresses: Option<String>,
    address_file: Option<String>,
    sitemap_url: Option<String>,
    core: PagewheelConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let mut core = match env::var("PAGEWHEEL_CONFIG_FILE") {
            Ok(path) => PagewheelConfig::from_json_file(&path)
                .map_err(|e| anyhow::anyhow!("PAGEWHEEL_CONFIG_FILE {}: {}", path, e))?,
            Err(_) => PagewheelConfig::default(),
        };

        if let Some(secs) = parse_env::<f64>("PAGEWHEEL_MIN_DWELL_SECS")? {
            core.scheduler.min_dwell_secs = secs;
        }
        if let Some(secs) = parse_env::<f64>("PAGEWHEEL_MAX_DWELL_SECS")? {
            core.scheduler.max_dwell_secs = secs;
        }
        if let Some(secs) = parse_env::<u64>("PAGEWHEEL_FETCH_TIMEOUT_SECS")? {
            core.resolver.fetch_timeout_secs = secs;
        }

        let sitemap_url = non_empty_env("PAGEWHEEL_SITEMAP_URL");
        let source = match env::var("PAGEWHEEL_SOURCE") {
            Ok(s) => match s.to_lowercase().as_str() {
                "manual" => Source::Manual,
                "sitemap" => Source::Sitemap,
                other => anyhow::bail!(
                    "PAGEWHEEL_SOURCE '{}' is not supported. Supported: manual, sitemap",
                    other
                ),
            },
            Err(_) if sitemap_url.is_some() => Source::Sitemap,
            Err(_) => Source::Manual,
        };

        Ok(Self {
            source,
            addresses: non_empty_env("PAGEWHEEL_ADDRESSES"),
            address_file: non_empty_env("PAGEWHEEL_ADDRESS_FILE"),
            sitemap_url,
            core,
            log_level: env::var("PAGEWHEEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Everything here is checked before the scheduler exists, so a
    /// rejected configuration never enters a running state.
    fn validate(&self) -> Result<()> {
        self.core.validate()?;

        match self.source {
            Source::Sitemap => {
                if self.sitemap_url.is_none() {
                    anyhow::bail!(
                        "PAGEWHEEL_SITEMAP_URL is required when PAGEWHEEL_SOURCE=sitemap. \
                        Set it via: export PAGEWHEEL_SITEMAP_URL=https://example.com/sitemap.xml"
                    );
                }
                if cfg!(not(feature = "http")) {
                    anyhow::bail!("Sitemap source requires the `http` feature");
                }
            }
            Source::Manual => {
                if self.addresses.is_none() && self.address_file.is_none() {
                    anyhow::bail!(
                        "No addresses given. Set PAGEWHEEL_ADDRESSES, PAGEWHEEL_ADDRESS_FILE, \
                        or PAGEWHEEL_SITEMAP_URL"
                    );
                }
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PAGEWHEEL_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match non_empty_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        None => Ok(None),
    }
}

/// Display sink that writes each address to the log
struct LogDisplay;

#[async_trait::async_trait]
impl Display for LogDisplay {
    async fn show(&self, address: &str) {
        info!("Showing {}", address);
    }

    async fn clear(&self) {
        info!("Display cleared");
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PagewheelExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PagewheelExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PagewheelExitCode::ConfigError.into();
    }

    info!("Starting pagewheeld");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PagewheelExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => PagewheelExitCode::CleanShutdown,
            Err(e) if is_input_error(&e) => {
                error!("{}", e);
                PagewheelExitCode::ConfigError
            }
            Err(e) => {
                error!("Daemon error: {}", e);
                PagewheelExitCode::RuntimeError
            }
        }
    });

    result.into()
}

fn is_input_error(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<pagewheel_core::Error>(),
        Some(pagewheel_core::Error::InvalidInput(_)) | Some(pagewheel_core::Error::Io(_))
    )
}

/// Build the working address list from the configured source
async fn load_addresses(config: &Config) -> Result<AddressList> {
    match config.source {
        Source::Manual => {
            let mut raw = String::new();
            if let Some(ref path) = config.address_file {
                raw.push_str(&std::fs::read_to_string(path).map_err(pagewheel_core::Error::from)?);
                raw.push('\n');
            }
            if let Some(ref inline) = config.addresses {
                raw.push_str(&inline.replace(',', "\n"));
            }

            debug!("Normalized address text:\n{}", parser::normalize_text(&raw));
            Ok(parser::parse(&raw))
        }
        Source::Sitemap => resolve_sitemap(config).await,
    }
}

#[cfg(feature = "http")]
async fn resolve_sitemap(config: &Config) -> Result<AddressList> {
    let index = config.sitemap_url.as_deref().unwrap_or_default();
    let fetcher = pagewheel_http::HttpFetcher::from_config(&config.core.resolver)?;
    let resolver =
        pagewheel_core::SitemapResolver::from_config(&config.core.resolver, std::sync::Arc::new(fetcher))?;

    let resolution = resolver.resolve(index).await;
    info!(
        "Resolved {} address(es) from {} [{}]",
        resolution.addresses().len(),
        index,
        resolution.provenance()
    );
    Ok(resolution.into_addresses())
}

#[cfg(not(feature = "http"))]
async fn resolve_sitemap(_config: &Config) -> Result<AddressList> {
    anyhow::bail!("Sitemap source requires the `http` feature")
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let addresses = load_addresses(&config).await?;
    if addresses.is_empty() {
        return Err(pagewheel_core::Error::invalid_input(
            "The address list is empty; add at least one address",
        )
        .into());
    }

    let (scheduler, events) =
        RotationScheduler::spawn(Box::new(LogDisplay), config.core.scheduler.clone())?;

    let reporter = tokio::spawn(async move {
        let mut events = ReceiverStream::new(events);
        while let Some(event) = events.next().await {
            match event {
                SchedulerEvent::Countdown { .. } | SchedulerEvent::Advancing => {
                    debug!("{}", event.status_line())
                }
                _ => info!("{}", event.status_line()),
            }
        }
    });

    scheduler.start(addresses).await?;

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);

    let pages = scheduler.stop().await?;
    info!("Total pages viewed: {}", pages);

    scheduler.shutdown().await?;
    let _ = reporter.await;

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
