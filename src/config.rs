use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::actor::retry::RetryConfig;
use crate::constants::{
    DEFAULT_PAGE_SIZE, INITIAL_RETRY_DELAY_MS, MAX_RETRIES, MAX_RETRY_DELAY_SECS,
};
use crate::scroll::FilterState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scroller: ScrollerConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    /// Settings for the in-memory mailbox the CLI browses
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Behaviour switches for [`ListScroller`](crate::scroll::ListScroller).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollerConfig {
    /// Remember the include-spam/trash capability after the first probe
    #[serde(default = "default_true")]
    pub cache_capability: bool,
    /// Fail a page fetch whose filters changed while it was in flight
    #[serde(default = "default_true")]
    pub reject_stale: bool,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            cache_capability: true,
            reject_stale: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.max_retries,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_secs(self.max_delay_secs),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_item_count")]
    pub item_count: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Simulated latency for asynchronous backend calls
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub filters: FilterState,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            item_count: default_item_count(),
            page_size: default_page_size(),
            latency_ms: 0,
            filters: FilterState::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    MAX_RETRIES
}

fn default_initial_delay_ms() -> u64 {
    INITIAL_RETRY_DELAY_MS
}

fn default_max_delay_secs() -> u64 {
    MAX_RETRY_DELAY_SECS
}

fn default_item_count() -> usize {
    120
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mailscroll");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.demo.page_size == 0 {
            anyhow::bail!("demo.page_size must be at least 1");
        }
        Ok(config)
    }
}
