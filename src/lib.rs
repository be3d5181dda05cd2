//! sitesweep - sitemap-driven Lighthouse audits
//!
//! Discovers a site's pages from its XML sitemaps and runs a Lighthouse
//! audit against each one, saving one HTML report per page.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Sitemap**: Sitemap fetching, parsing, and URL aggregation
//! - **Audit**: Headless Chrome lifecycle, the Lighthouse engine, and reports
//! - **Runner**: The end-to-end run sequence
//!
//! # Usage
//!
//! ```rust,no_run
//! use sitesweep::{Config, Runner};
//!
//! #[tokio::main]
//! async fn main() -> sitesweep::Result<()> {
//!     let runner = Runner::from_config(&Config::load())?;
//!     let summary = runner.run().await?;
//!     println!("{} reports written", summary.saved);
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod core;
pub mod runner;
pub mod sitemap;

// Re-export commonly used items
pub use core::{Config, Result, RunSummary, SweepError};
pub use runner::Runner;
