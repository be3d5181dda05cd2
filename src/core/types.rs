//! Shared types used across sitesweep modules
//!
//! Contains the URL set, audit categories, and per-URL / per-run results.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Ordered, duplicate-free collection of page URLs.
///
/// Uniqueness is by exact string comparison; no normalization of trailing
/// slashes, casing, or query strings. The first occurrence wins its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSet {
    urls: Vec<String>,
}

impl UrlSet {
    /// Number of unique URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether no URLs were collected
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterate URLs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Borrow the URLs as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }
}

impl FromIterator<String> for UrlSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let urls = iter
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();
        Self { urls }
    }
}

/// Lighthouse category scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditCategory {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
}

impl AuditCategory {
    /// The fixed audit profile
    pub const ALL: [AuditCategory; 4] = [
        AuditCategory::Performance,
        AuditCategory::Accessibility,
        AuditCategory::BestPractices,
        AuditCategory::Seo,
    ];

    /// Identifier as understood by `--only-categories`
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Performance => "performance",
            AuditCategory::Accessibility => "accessibility",
            AuditCategory::BestPractices => "best-practices",
            AuditCategory::Seo => "seo",
        }
    }
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit engine log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLogLevel {
    Silent,
    #[default]
    Info,
    Verbose,
}

/// Rendered report for a single audited URL
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// URL the report describes
    pub url: String,
    /// HTML report body, written out verbatim
    pub body: String,
}

/// Result of one audit cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Report written to this path
    Saved(PathBuf),
    /// Audit failed; message already logged
    Failed(String),
}

impl AuditOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, AuditOutcome::Saved(_))
    }
}

/// Counts for one complete run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Unique URLs discovered across all sitemaps
    pub discovered: usize,
    /// Reports written
    pub saved: usize,
    /// Audits that failed
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_set_dedup_keeps_first_seen_order() {
        let set: UrlSet = ["https://x/1", "https://x/2", "https://x/2", "https://x/3"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            set.as_slice(),
            &["https://x/1", "https://x/2", "https://x/3"]
        );
    }

    #[test]
    fn test_url_set_exact_string_comparison() {
        let set: UrlSet = ["https://x/a", "https://x/a/", "https://X/a", "https://x/a?q=1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_category_identifiers() {
        let ids: Vec<&str> = AuditCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(ids, ["performance", "accessibility", "best-practices", "seo"]);
        assert_eq!(AuditCategory::BestPractices.to_string(), "best-practices");
    }
}
