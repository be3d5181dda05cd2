//! Page auditor
//!
//! One audit cycle per URL: launch a browser, run Lighthouse through it,
//! save the report, release the browser. Failures stay inside the cycle.

use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::browser::{BrowserLauncher, BrowserSession};
use crate::audit::lighthouse::AuditEngine;
use crate::audit::report::write_report;
use crate::core::{AuditOutcome, Result};

/// Audits single pages with injected browser and engine capabilities
pub struct PageAuditor {
    launcher: Arc<dyn BrowserLauncher>,
    engine: Arc<dyn AuditEngine>,
    output_dir: PathBuf,
}

impl PageAuditor {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        engine: Arc<dyn AuditEngine>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            launcher,
            engine,
            output_dir: output_dir.into(),
        }
    }

    /// Directory reports are written to
    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Audit `url` (1-based `index` of `total`), stamping the report with today's UTC date
    pub async fn audit(&self, url: &str, index: usize, total: usize) -> AuditOutcome {
        self.audit_on(url, index, total, Utc::now().date_naive())
            .await
    }

    /// Audit `url`, stamping the report with `date`
    pub async fn audit_on(
        &self,
        url: &str,
        index: usize,
        total: usize,
        date: NaiveDate,
    ) -> AuditOutcome {
        tracing::info!("Processing {}/{}: {}", index, total, url);

        match self.run_cycle(url, date).await {
            Ok(path) => {
                tracing::info!("Lighthouse report for {} saved to {}", url, path.display());
                AuditOutcome::Saved(path)
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Error running Lighthouse on {}", url);
                AuditOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_cycle(&self, url: &str, date: NaiveDate) -> Result<PathBuf> {
        // Dropped on every return path below, which kills the browser.
        let session = BrowserSession::acquire(self.launcher.as_ref()).await?;
        let report = self.engine.run(url, session.port()).await?;
        write_report(&self.output_dir, date, &report).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::browser::BrowserInstance;
    use crate::core::{AuditReport, SweepError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        launched: AtomicUsize,
        killed: AtomicUsize,
    }

    struct FakeInstance(Arc<Counters>);

    impl BrowserInstance for FakeInstance {
        fn port(&self) -> u16 {
            9222
        }

        fn kill(&mut self) -> Result<()> {
            self.0.killed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeLauncher {
        counters: Arc<Counters>,
        fail: bool,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
            if self.fail {
                return Err(SweepError::browser("no display"));
            }
            self.counters.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeInstance(Arc::clone(&self.counters))))
        }
    }

    struct FakeEngine {
        fail: bool,
    }

    #[async_trait]
    impl AuditEngine for FakeEngine {
        async fn run(&self, url: &str, port: u16) -> Result<AuditReport> {
            assert_eq!(port, 9222);
            if self.fail {
                return Err(SweepError::audit("page load timed out"));
            }
            Ok(AuditReport {
                url: url.to_string(),
                body: format!("<html>{}</html>", url),
            })
        }
    }

    fn auditor(
        dir: &std::path::Path,
        launch_fails: bool,
        audit_fails: bool,
    ) -> (PageAuditor, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let auditor = PageAuditor::new(
            Arc::new(FakeLauncher {
                counters: Arc::clone(&counters),
                fail: launch_fails,
            }),
            Arc::new(FakeEngine { fail: audit_fails }),
            dir,
        );
        (auditor, counters)
    }

    fn jan5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[tokio::test]
    async fn test_success_writes_report_and_releases() {
        let dir = tempfile::tempdir().unwrap();
        let (auditor, counters) = auditor(dir.path(), false, false);

        let outcome = auditor.audit_on("https://x/1", 1, 1, jan5()).await;

        let expected = dir.path().join("2024-01-05-https%3A%2F%2Fx%2F1.html");
        assert_eq!(outcome, AuditOutcome::Saved(expected.clone()));
        assert_eq!(
            std::fs::read_to_string(expected).unwrap(),
            "<html>https://x/1</html>"
        );
        assert_eq!(counters.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counters.killed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_still_releases() {
        let dir = tempfile::tempdir().unwrap();
        let (auditor, counters) = auditor(dir.path(), false, true);

        let outcome = auditor.audit_on("https://x/1", 1, 1, jan5()).await;

        assert!(matches!(outcome, AuditOutcome::Failed(ref m) if m.contains("timed out")));
        assert_eq!(counters.killed.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_still_releases() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-created");
        let (auditor, counters) = auditor(&missing, false, false);

        let outcome = auditor.audit("https://x/1", 1, 1).await;

        assert!(!outcome.is_saved());
        assert_eq!(counters.killed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let (auditor, counters) = auditor(dir.path(), true, false);

        let outcome = auditor.audit("https://x/1", 2, 3).await;

        assert!(matches!(outcome, AuditOutcome::Failed(ref m) if m.contains("no display")));
        assert_eq!(counters.launched.load(Ordering::SeqCst), 0);
        assert_eq!(counters.killed.load(Ordering::SeqCst), 0);
    }
}
