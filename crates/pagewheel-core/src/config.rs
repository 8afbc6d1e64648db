//! Configuration types for pagewheel
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder replaced by the percent-encoded target in relay templates
pub const RELAY_URL_PLACEHOLDER: &str = "{url}";

/// Largest accepted dwell bound, in seconds (one week)
pub const MAX_DWELL_SECS: f64 = 604_800.0;

/// Main pagewheel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagewheelConfig {
    /// Rotation scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Sitemap resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl PagewheelConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.scheduler.validate()?;
        self.resolver.validate()?;
        Ok(())
    }
}

/// Rotation scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Lower bound of the dwell duration (seconds, inclusive)
    #[serde(default = "default_min_dwell_secs")]
    pub min_dwell_secs: f64,

    /// Upper bound of the dwell duration (seconds, inclusive)
    #[serde(default = "default_max_dwell_secs")]
    pub max_dwell_secs: f64,

    /// Countdown tick period in milliseconds
    ///
    /// Each tick decrements the remaining-seconds counter by one.
    #[serde(default = "default_countdown_tick_ms")]
    pub countdown_tick_ms: u64,

    /// Capacity of the status event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Capacity of the command channel feeding the scheduler task
    #[serde(default = "default_command_channel_capacity")]
    pub command_channel_capacity: usize,
}

impl SchedulerConfig {
    /// Use a fixed dwell range
    pub fn with_dwell_range(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_dwell_secs = min_secs;
        self.max_dwell_secs = max_secs;
        self
    }

    /// Validate the scheduler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.min_dwell_secs.is_finite() || self.min_dwell_secs <= 0.0 {
            return Err(crate::Error::config("min_dwell_secs must be > 0"));
        }
        if !self.max_dwell_secs.is_finite() || self.max_dwell_secs < self.min_dwell_secs {
            return Err(crate::Error::config(format!(
                "max_dwell_secs ({}) must be >= min_dwell_secs ({})",
                self.max_dwell_secs, self.min_dwell_secs
            )));
        }
        if self.max_dwell_secs > MAX_DWELL_SECS {
            return Err(crate::Error::config(format!(
                "max_dwell_secs ({}) must be <= {}",
                self.max_dwell_secs, MAX_DWELL_SECS
            )));
        }
        if self.countdown_tick_ms == 0 {
            return Err(crate::Error::config("countdown_tick_ms must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        if self.command_channel_capacity == 0 {
            return Err(crate::Error::config("command_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_dwell_secs: default_min_dwell_secs(),
            max_dwell_secs: default_max_dwell_secs(),
            countdown_tick_ms: default_countdown_tick_ms(),
            event_channel_capacity: default_event_channel_capacity(),
            command_channel_capacity: default_command_channel_capacity(),
        }
    }
}

/// A single stage of the retrieval chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Fetch the index address as-is
    Direct {
        /// Provenance tag reported on success
        tag: String,
    },

    /// Fetch through a relay service
    Relay {
        /// Provenance tag reported on success
        tag: String,
        /// Relay URI with a `{url}` placeholder for the encoded target
        template: String,
    },
}

impl StrategyConfig {
    /// Direct strategy with the given tag
    pub fn direct(tag: impl Into<String>) -> Self {
        StrategyConfig::Direct { tag: tag.into() }
    }

    /// Relay strategy with the given tag and template
    pub fn relay(tag: impl Into<String>, template: impl Into<String>) -> Self {
        StrategyConfig::Relay {
            tag: tag.into(),
            template: template.into(),
        }
    }

    /// Get the provenance tag
    pub fn tag(&self) -> &str {
        match self {
            StrategyConfig::Direct { tag } => tag,
            StrategyConfig::Relay { tag, .. } => tag,
        }
    }

    /// Validate the strategy configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.tag().trim().is_empty() {
            return Err(crate::Error::config("Strategy tag cannot be empty"));
        }
        if let StrategyConfig::Relay { tag, template } = self
            && !template.contains(RELAY_URL_PLACEHOLDER)
        {
            return Err(crate::Error::config(format!(
                "Relay '{}' template must contain {}",
                tag, RELAY_URL_PLACEHOLDER
            )));
        }
        Ok(())
    }
}

/// Sitemap resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Ordered retrieval chain; the first stage yielding a body wins
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,

    /// Addresses used when even the index origin cannot be derived
    #[serde(default = "default_demo_fallback")]
    pub demo_fallback: Vec<String>,

    /// Per-request timeout for the HTTP fetcher (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.strategies.is_empty() {
            return Err(crate::Error::config("At least one retrieval strategy is required"));
        }
        for strategy in &self.strategies {
            strategy.validate()?;
        }
        if self.demo_fallback.is_empty() {
            return Err(crate::Error::config("Demo fallback list cannot be empty"));
        }
        if let Some(bad) = self
            .demo_fallback
            .iter()
            .find(|a| !(a.starts_with("http://") || a.starts_with("https://")))
        {
            return Err(crate::Error::config(format!(
                "Demo fallback address must be absolute: {}",
                bad
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(crate::Error::config("fetch_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            demo_fallback: default_demo_fallback(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_min_dwell_secs() -> f64 {
    5.0
}

fn default_max_dwell_secs() -> f64 {
    12.0
}

fn default_countdown_tick_ms() -> u64 {
    1000
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_command_channel_capacity() -> usize {
    32
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::direct("direct"),
        StrategyConfig::relay("proxy-a", "https://api.allorigins.win/raw?url={url}"),
        StrategyConfig::relay("proxy-b", "https://corsproxy.io/?url={url}"),
    ]
}

fn default_demo_fallback() -> Vec<String> {
    [
        "https://example.com",
        "https://www.wikipedia.org",
        "https://www.rust-lang.org",
        "https://developer.mozilla.org",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
