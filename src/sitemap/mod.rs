//! Sitemap discovery
//!
//! Fetches XML sitemaps and merges the page URLs they declare.

mod aggregator;
mod fetcher;

pub use aggregator::UrlAggregator;
pub use fetcher::{parse_sitemap, SitemapFetcher};
