//! Headless browser lifecycle
//!
//! Launches one isolated Chrome per audit and guarantees it is terminated
//! when the [`BrowserSession`] holding it goes out of scope.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::{Child, Command};

use crate::core::config::BrowserConfig;
use crate::core::{Result, SweepError};

/// Binaries tried in order when no explicit Chrome path is configured
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// A running browser reachable on a local debugging port
pub trait BrowserInstance: Send {
    /// DevTools port the audit engine connects to
    fn port(&self) -> u16;

    /// Terminate the browser process
    fn kill(&mut self) -> Result<()>;
}

/// Capability to start a fresh browser instance
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>>;
}

/// Scoped ownership of one browser instance.
///
/// The instance is killed exactly once, when the session is dropped.
pub struct BrowserSession {
    instance: Box<dyn BrowserInstance>,
}

impl BrowserSession {
    /// Launch a browser and take ownership of it
    pub async fn acquire(launcher: &dyn BrowserLauncher) -> Result<Self> {
        let instance = launcher.launch().await?;
        tracing::debug!(port = instance.port(), "browser acquired");
        Ok(Self { instance })
    }

    pub fn port(&self) -> u16 {
        self.instance.port()
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let port = self.instance.port();
        match self.instance.kill() {
            Ok(()) => tracing::debug!(port, "browser released"),
            Err(e) => tracing::warn!(port, error = %e, "failed to terminate browser"),
        }
    }
}

/// `/json/version` payload served once DevTools is listening
#[derive(Debug, Deserialize)]
struct DevToolsVersion {
    #[serde(rename = "Browser", default)]
    browser: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    web_socket_debugger_url: String,
}

/// Launches local Chrome/Chromium processes
pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
    flags: Vec<String>,
    poll_interval: Duration,
    max_attempts: u32,
    client: Client,
}

impl ChromeLauncher {
    /// Create a launcher from configuration
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            chrome_path: config.chrome_path.clone(),
            flags: config.flags.clone(),
            poll_interval: Duration::from_millis(config.startup_poll_interval_ms),
            max_attempts: config.startup_max_attempts.max(1),
            client,
        })
    }

    /// Locate the Chrome binary: explicit path, then CHROME_PATH, then PATH
    pub fn resolve_binary(&self) -> Result<PathBuf> {
        pick_binary(self.chrome_path.as_deref(), env::var_os("CHROME_PATH"))
    }

    /// Full argument list for one instance
    fn command_args(&self, port: u16, profile: &Path) -> Vec<String> {
        let mut args = self.flags.clone();
        args.push(format!("--remote-debugging-port={}", port));
        args.push(format!("--user-data-dir={}", profile.display()));
        args.push("--no-first-run".to_string());
        args.push("--no-default-browser-check".to_string());
        args.push("about:blank".to_string());
        args
    }

    /// Poll DevTools until it answers, the process dies, or attempts run out
    async fn wait_until_ready(&self, child: &mut Child, port: u16) -> Result<()> {
        let endpoint = format!("http://127.0.0.1:{}/json/version", port);

        for attempt in 1..=self.max_attempts {
            if let Some(status) = child.try_wait()? {
                return Err(SweepError::browser(format!(
                    "Chrome exited during startup ({})",
                    status
                )));
            }

            if let Ok(resp) = self.client.get(&endpoint).send().await {
                if resp.status().is_success() {
                    let version: DevToolsVersion = serde_json::from_str(&resp.text().await?)?;
                    tracing::debug!(
                        port,
                        attempt,
                        browser = %version.browser,
                        ws = %version.web_socket_debugger_url,
                        "DevTools ready"
                    );
                    return Ok(());
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(SweepError::browser(format!(
            "Chrome did not open DevTools on port {} after {} attempts",
            port, self.max_attempts
        )))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
        let binary = self.resolve_binary()?;
        let port = free_port()?;
        let profile = tempfile::Builder::new()
            .prefix("sitesweep-chrome-")
            .tempdir()?;

        let mut command = Command::new(&binary);
        command
            .args(self.command_args(port, profile.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        // Own group so renderer and zygote helpers die with the browser.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SweepError::ChromeNotFound
            } else {
                SweepError::browser(format!("Failed to start {}: {}", binary.display(), e))
            }
        })?;

        tracing::debug!(binary = %binary.display(), port, pid = ?child.id(), "Chrome started");

        if let Err(e) = self.wait_until_ready(&mut child, port).await {
            let _ = terminate(&mut child);
            return Err(e);
        }

        Ok(Box::new(ChromeInstance {
            child,
            port,
            _profile: profile,
        }))
    }
}

/// A Chrome process plus its throwaway profile directory
struct ChromeInstance {
    child: Child,
    port: u16,
    _profile: TempDir,
}

impl BrowserInstance for ChromeInstance {
    fn port(&self) -> u16 {
        self.port
    }

    fn kill(&mut self) -> Result<()> {
        terminate(&mut self.child)
            .map_err(|e| SweepError::browser(format!("Failed to kill Chrome: {}", e)))
    }
}

fn pick_binary(configured: Option<&Path>, env_path: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    CHROME_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(SweepError::ChromeNotFound)
}

/// Kill the browser's whole process group, then the browser itself
fn terminate(child: &mut Child) -> std::io::Result<()> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        if let Err(e) = kill_process_group(pid) {
            tracing::debug!(pid, error = %e, "process group kill failed");
        }
    }
    child.start_kill()
}

#[cfg(unix)]
fn kill_process_group(pid: u32) -> std::io::Result<()> {
    if pid == 0 || pid > i32::MAX as u32 {
        return Err(std::io::Error::from(std::io::ErrorKind::InvalidInput));
    }

    // SAFETY: a negative pid addresses the process group led by `pid`,
    // which the launcher created with `process_group(0)`.
    let result = unsafe { libc::kill(-(pid as i32), libc::SIGKILL) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Ask the OS for an unused loopback port
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}
