//! # Configuration Management
//!
//! Loads `surf-config.toml`, which controls where the forecast site lives,
//! how patient the HTTP client is, and how forecasts are printed. Every
//! section and field is optional; anything missing takes its default.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "surf-config.toml";

/// Application configuration loaded from surf-config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Forecast site and HTTP client settings
    pub site: SiteConfig,
    /// Terminal output settings
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host of the forecast site
    pub base_url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of forecast days to print
    pub max_days: usize,
    pub show_secondary_swells: bool,
    /// One summary line per day instead of one line per hour
    pub compact: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            base_url: "https://www.surf-forecast.com".to_string(),
            timeout_secs: 10,
            user_agent: concat!("surf-glass/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            max_days: 9,
            show_secondary_swells: true,
            compact: false,
        }
    }
}

impl Config {
    /// Load configuration from surf-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), site = %config.site.base_url, "loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "invalid config file format: {e}; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to surf-config.toml
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(CONFIG_FILE)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("could not write {}", path.display()))?;
        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}
