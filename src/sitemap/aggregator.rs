//! URL aggregator
//!
//! Fetches every configured sitemap concurrently and merges the results into
//! one duplicate-free [`UrlSet`].

use futures::future::join_all;

use crate::core::config::SitemapConfig;
use crate::core::{Result, UrlSet};
use crate::sitemap::fetcher::SitemapFetcher;

/// Collects page URLs across a fixed list of sitemaps
pub struct UrlAggregator {
    fetcher: SitemapFetcher,
    sitemaps: Vec<String>,
}

impl UrlAggregator {
    /// Create an aggregator over `sitemaps`, merged in the given order
    pub fn new(fetcher: SitemapFetcher, sitemaps: Vec<String>) -> Self {
        Self { fetcher, sitemaps }
    }

    /// Create an aggregator from configuration
    pub fn from_config(config: &SitemapConfig) -> Result<Self> {
        Ok(Self::new(
            SitemapFetcher::from_config(config)?,
            config.urls.clone(),
        ))
    }

    /// Sitemaps this aggregator reads
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Fetch all sitemaps and merge their URLs.
    ///
    /// Each sitemap is fetched on its own task; a failing sitemap contributes
    /// nothing. Only a task that panics or is cancelled makes this fail.
    pub async fn collect(&self) -> Result<UrlSet> {
        let handles: Vec<_> = self
            .sitemaps
            .iter()
            .cloned()
            .map(|sitemap| {
                let fetcher = self.fetcher.clone();
                tokio::spawn(async move { fetcher.fetch(&sitemap).await })
            })
            .collect();

        let mut merged = Vec::new();
        for urls in join_all(handles).await {
            merged.extend(urls?);
        }

        Ok(merged.into_iter().collect())
    }
}
