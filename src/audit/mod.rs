//! Page auditing
//!
//! Browser lifecycle, the Lighthouse engine, report naming, and the per-page
//! audit cycle that ties them together.

pub mod auditor;
pub mod browser;
pub mod lighthouse;
pub mod report;

pub use auditor::PageAuditor;
pub use browser::{BrowserInstance, BrowserLauncher, BrowserSession, ChromeLauncher};
pub use lighthouse::{AuditEngine, LighthouseCli};
pub use report::{report_file_name, report_path};
