//! JSON output helpers.
//!
//! `format_report` renders a settled batch for `--json`; `format_error` is
//! used by every `--json` code path when a command fails before a batch runs.

use anyhow::{Context, Result};

use crate::domain::BatchReport;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format a settled batch, adding a top-level `success` flag.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &BatchReport) -> Result<String> {
    let mut value = serde_json::to_value(report).context("JSON serialization failed")?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("success".into(), report.is_success().into());
    }
    serde_json::to_string_pretty(&value).context("JSON serialization failed")
}

/// Compact result map as published in the `result-map` step output.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_result_map(report: &BatchReport) -> Result<String> {
    serde_json::to_string(&report.results).context("JSON serialization failed")
}
