//! Configuration management for the stockpoll poller
//!
//! This module handles loading and validating configuration from environment variables,
//! TOML files, and command-line overrides applied by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::TrackedTarget;

/// Longest accepted polling interval (one year)
pub const MAX_INTERVAL_SECS: u64 = 86_400 * 365;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Poller configuration
    #[serde(default)]
    pub poller: PollerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Poller-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Product URLs to poll, in seeding order
    pub targets: Vec<String>,

    /// Delay between polls of the same target in seconds
    pub interval_secs: u64,

    /// Request timeout in seconds; unbounded when absent
    pub request_timeout_secs: Option<u64>,

    /// Pinned User-Agent; a browser agent is picked at random when absent
    pub user_agent: Option<String>,

    /// Halt every target on the first failure instead of isolating it
    pub fail_fast: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            interval_secs: 60,
            request_timeout_secs: None,
            user_agent: None,
            fail_fast: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = PollerConfig::default();

        let interval_secs = match std::env::var("STOCKPOLL_INTERVAL_SECS") {
            Ok(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("STOCKPOLL_INTERVAL_SECS is not an integer: {v}"))?,
            Err(_) => defaults.interval_secs,
        };

        let request_timeout_secs = match std::env::var("STOCKPOLL_REQUEST_TIMEOUT") {
            Ok(v) => Some(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("STOCKPOLL_REQUEST_TIMEOUT is not an integer: {v}"))?,
            ),
            Err(_) => None,
        };

        let user_agent = std::env::var("STOCKPOLL_USER_AGENT")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let fail_fast = std::env::var("STOCKPOLL_FAIL_FAST")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let targets = std::env::var("STOCKPOLL_TARGETS")
            .map(|v| split_targets(&v))
            .unwrap_or_default();

        let log_level =
            std::env::var("STOCKPOLL_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("STOCKPOLL_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            poller: PollerConfig {
                targets,
                interval_secs,
                request_timeout_secs,
                user_agent,
                fail_fast,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than 0");
        }

        if self.poller.interval_secs > MAX_INTERVAL_SECS {
            anyhow::bail!("interval_secs must be at most {MAX_INTERVAL_SECS}");
        }

        if self.poller.request_timeout_secs == Some(0) {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.poller.targets.is_empty() {
            anyhow::bail!("at least one target URL is required");
        }

        for url in &self.poller.targets {
            TrackedTarget::parse(url).with_context(|| format!("Invalid target: {url}"))?;
        }

        Ok(())
    }

    /// Classified targets in configured order
    pub fn tracked_targets(&self) -> Result<Vec<TrackedTarget>> {
        self.poller
            .targets
            .iter()
            .map(|url| TrackedTarget::parse(url).with_context(|| format!("Invalid target: {url}")))
            .collect()
    }

    /// Get polling interval as Duration
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.poller.interval_secs)
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.poller.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Split a comma-separated target list, dropping blanks
fn split_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
