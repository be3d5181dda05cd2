//! Custom error types for sitesweep
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for sitesweep operations
#[derive(Error, Debug)]
pub enum SweepError {
    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed sitemap XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML that is not a `<urlset>` of `<url><loc>` entries
    #[error("Unexpected sitemap shape: {0}")]
    SitemapShape(String),

    /// Browser launch or control errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// No Chrome/Chromium binary could be located
    #[error("Chrome not found. Install Chrome or Chromium, or set CHROME_PATH")]
    ChromeNotFound,

    /// Audit engine errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Lighthouse CLI not installed
    #[error("lighthouse not found. Install with: npm install -g lighthouse")]
    LighthouseNotFound,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A spawned task panicked or was cancelled
    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type for sitesweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

impl SweepError {
    /// Create a sitemap shape error
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::SitemapShape(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create an audit error
    pub fn audit(msg: impl Into<String>) -> Self {
        Self::Audit(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}
