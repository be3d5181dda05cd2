//! Report file naming and persistence

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};

use crate::core::{AuditReport, Result, SweepError};

/// URI component encoding: everything but `A-Za-z0-9-_.!~*'()` is escaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `<YYYY-MM-DD>-<percent-encoded-url>.html`
pub fn report_file_name(date: NaiveDate, url: &str) -> String {
    format!(
        "{}-{}.html",
        date.format("%Y-%m-%d"),
        utf8_percent_encode(url, URI_COMPONENT)
    )
}

/// Report path for `url` inside `output_dir`
pub fn report_path(output_dir: &Path, date: NaiveDate, url: &str) -> PathBuf {
    output_dir.join(report_file_name(date, url))
}

/// Write a report body verbatim, returning the file it landed in
pub async fn write_report(
    output_dir: &Path,
    date: NaiveDate,
    report: &AuditReport,
) -> Result<PathBuf> {
    let path = report_path(output_dir, date, &report.url);
    tokio::fs::write(&path, report.body.as_bytes())
        .await
        .map_err(|e| SweepError::with_context(format!("writing {}", path.display()), e))?;
    Ok(path)
}
