//! Lighthouse audit engine - wraps the lighthouse CLI
//!
//! Runs the fixed audit profile against a page through an already running
//! browser and captures the HTML report from stdout.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::core::config::AuditConfig;
use crate::core::{AuditCategory, AuditLogLevel, AuditReport, Result, SweepError};

/// Capability to audit one URL through a browser on `port`
#[async_trait]
pub trait AuditEngine: Send + Sync {
    async fn run(&self, url: &str, port: u16) -> Result<AuditReport>;
}

/// Audit engine backed by the `lighthouse` command
pub struct LighthouseCli {
    /// Executable name or path
    bin: String,
    categories: Vec<AuditCategory>,
    max_wait_for_load_ms: u64,
    log_level: AuditLogLevel,
}

impl LighthouseCli {
    /// Create an engine from configuration
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            bin: config.lighthouse_bin.clone(),
            categories: config.categories.clone(),
            max_wait_for_load_ms: config.max_wait_for_load_ms,
            log_level: config.log_level,
        }
    }

    /// Check if lighthouse is installed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.bin)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Arguments for auditing `url` via the browser on `port`
    fn args(&self, url: &str, port: u16) -> Vec<String> {
        let categories = self
            .categories
            .iter()
            .map(AuditCategory::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut args = vec![
            url.to_string(),
            format!("--port={}", port),
            "--output=html".to_string(),
            "--output-path=stdout".to_string(),
            format!("--only-categories={}", categories),
            format!("--max-wait-for-load={}", self.max_wait_for_load_ms),
        ];

        match self.log_level {
            AuditLogLevel::Silent => args.push("--quiet".to_string()),
            AuditLogLevel::Info => {}
            AuditLogLevel::Verbose => args.push("--verbose".to_string()),
        }

        args
    }
}

#[async_trait]
impl AuditEngine for LighthouseCli {
    async fn run(&self, url: &str, port: u16) -> Result<AuditReport> {
        let output = Command::new(&self.bin)
            .args(self.args(url, port))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SweepError::LighthouseNotFound
                } else {
                    SweepError::audit(format!("Failed to run lighthouse: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SweepError::audit(format!(
                "lighthouse exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let body = String::from_utf8_lossy(&output.stdout).into_owned();
        if body.trim().is_empty() {
            return Err(SweepError::audit("lighthouse produced an empty report"));
        }

        Ok(AuditReport {
            url: url.to_string(),
            body,
        })
    }
}
