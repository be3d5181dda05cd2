//! Run controller
//!
//! Owns one end-to-end sweep: prepare the output directory, discover URLs,
//! then audit them one at a time.

use std::sync::Arc;

use crate::audit::{ChromeLauncher, LighthouseCli, PageAuditor};
use crate::core::{Config, Result, RunSummary, SweepError};
use crate::sitemap::UrlAggregator;

/// Sequences discovery and auditing for a single run
pub struct Runner {
    aggregator: UrlAggregator,
    auditor: PageAuditor,
}

impl Runner {
    pub fn new(aggregator: UrlAggregator, auditor: PageAuditor) -> Self {
        Self {
            aggregator,
            auditor,
        }
    }

    /// Wire the real sitemap fetcher, Chrome launcher, and Lighthouse CLI
    pub fn from_config(config: &Config) -> Result<Self> {
        let aggregator = UrlAggregator::from_config(&config.sitemaps)?;
        let auditor = PageAuditor::new(
            Arc::new(ChromeLauncher::from_config(&config.browser)?),
            Arc::new(LighthouseCli::from_config(&config.audit)),
            config.audit.output_dir.clone(),
        );
        Ok(Self::new(aggregator, auditor))
    }

    /// Run the sweep.
    ///
    /// Errors returned here are fatal: the output directory could not be
    /// prepared or aggregation itself broke. Individual audit failures are
    /// counted in the summary instead.
    pub async fn run(&self) -> Result<RunSummary> {
        let output_dir = self.auditor.output_dir();
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            SweepError::with_context(format!("creating {}", output_dir.display()), e)
        })?;

        let urls = self.aggregator.collect().await?;
        tracing::info!(
            sitemaps = self.aggregator.sitemaps().len(),
            "Found {} unique URLs",
            urls.len()
        );

        let mut summary = RunSummary {
            discovered: urls.len(),
            ..RunSummary::default()
        };

        if urls.is_empty() {
            tracing::info!("No URLs found in the sitemaps.");
            return Ok(summary);
        }

        let total = urls.len();
        for (i, url) in urls.iter().enumerate() {
            if self.auditor.audit(url, i + 1, total).await.is_saved() {
                summary.saved += 1;
            } else {
                summary.failed += 1;
            }
        }

        tracing::info!(
            saved = summary.saved,
            failed = summary.failed,
            "Audit run complete"
        );
        Ok(summary)
    }
}
