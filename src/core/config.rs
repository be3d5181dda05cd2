//! Configuration management for sitesweep
//!
//! Supports environment variables, config files, and runtime overrides.
//! With nothing configured, the defaults audit the two Rhapsody Media
//! sitemaps into `./lighthouse-reports`.
//!
//! Config file location: ~/.config/sitesweep/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, SweepError};
use crate::core::types::{AuditCategory, AuditLogLevel};

/// Main configuration for sitesweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sitemap discovery
    #[serde(default)]
    pub sitemaps: SitemapConfig,
    /// Headless browser launch
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Lighthouse audit profile and output
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Sitemap discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Sitemaps to fetch, in merge order
    pub urls: Vec<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Headless browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Explicit Chrome/Chromium binary; CHROME_PATH, then PATH, when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
    /// Flags passed to every launched instance
    pub flags: Vec<String>,
    /// Delay between DevTools readiness checks
    pub startup_poll_interval_ms: u64,
    /// Checks before a launch is abandoned
    pub startup_max_attempts: u32,
}

/// Audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Lighthouse executable
    pub lighthouse_bin: String,
    /// Where reports are written
    pub output_dir: PathBuf,
    /// Category scopes passed to `--only-categories`
    pub categories: Vec<AuditCategory>,
    /// Upper bound on page-load wait in milliseconds
    pub max_wait_for_load_ms: u64,
    /// Lighthouse log verbosity
    pub log_level: AuditLogLevel,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://www.rhapsodymedia.com/sitemap-0.xml".to_string(),
                "https://www.rhapsodymedia.com/server-sitemap.xml".to_string(),
            ],
            timeout_secs: 10,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: env::var_os("CHROME_PATH").map(PathBuf::from),
            flags: [
                "--headless",
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-background-networking",
                "--disable-extensions",
            ]
            .iter()
            .map(|f| f.to_string())
            .collect(),
            startup_poll_interval_ms: 500,
            startup_max_attempts: 50,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            lighthouse_bin: env::var("SITESWEEP_LIGHTHOUSE_BIN")
                .unwrap_or_else(|_| "lighthouse".to_string()),
            output_dir: env::var_os("SITESWEEP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./lighthouse-reports")),
            categories: AuditCategory::ALL.to_vec(),
            max_wait_for_load_ms: 30_000,
            log_level: AuditLogLevel::Info,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitesweep")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = Self::config_file();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "ignoring config file"),
            }
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing sections and fields take defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SweepError::config(format!("Failed to parse config: {}", e)))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SweepError::config(format!("Failed to serialize config: {}", e)))
    }
}
