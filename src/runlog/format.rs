//! Text layout of the run log
//!
//! The writer renders through these functions and the reader parses the same
//! markers back, so this file is the single place where the log's shape is
//! decided.

use std::path::Path;
use std::time::Duration;

use crate::models::{Mode, Outcome, Summary, TestId, TestRecord};

pub const RULE: &str = "======================================================================";
pub const MODE_PREFIX: &str = "Mode:";
pub const RUNNING_PREFIX: &str = "Running:";
pub const FAILED_HEADER: &str = "Failed tests:";
pub const TIMED_OUT_HEADER: &str = "Timed out tests:";

/// Seconds with two decimals, as used everywhere in the log
pub fn secs(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}

pub fn header(pytorch_path: &Path, log_path: &Path, mode: Mode) -> String {
    format!(
        "PyTorch path: {}\nLogging to: {}\n{} {}\n",
        pytorch_path.display(),
        log_path.display(),
        MODE_PREFIX,
        mode
    )
}

/// Progress prefix plus the block that opens one test
pub fn test_start(position: usize, total: usize, id: &TestId) -> String {
    format!("[{position}/{total}] \n{RULE}\n{RUNNING_PREFIX} {id}\n{RULE}\n")
}

/// One-line status closing a test block
pub fn status(record: &TestRecord, limit: Option<Duration>, detail: Option<&str>) -> String {
    let mut line = format!("{} ({}s", record.outcome, secs(record.duration));
    if let (Outcome::TimedOut, Some(limit)) = (record.outcome, limit) {
        line.push_str(&format!(", limit {}s", limit.as_secs()));
    }
    line.push(')');
    if let Some(detail) = detail {
        line.push_str(": ");
        line.push_str(detail.lines().next().unwrap_or_default());
    }
    line.push('\n');
    line
}

/// `  - <identifier> (<seconds>s)`
pub fn item(record: &TestRecord) -> String {
    format!("  - {} ({}s)\n", record.id, secs(record.duration))
}

pub fn summary(title: &str, summary: &Summary) -> String {
    let mut out = format!("\n{RULE}\n{title}\n{RULE}\n");
    out.push_str(&format!("Total tests run: {}\n", summary.total));
    out.push_str(&format!("Passed: {}\n", summary.passed));
    out.push_str(&format!("Skipped: {}\n", summary.skipped));
    out.push_str(&format!("Errors: {}\n", summary.errors));
    out.push_str(&format!("Failed: {}\n", summary.failed));
    out.push_str(&format!("Timed out: {}\n", summary.timed_out));
    out.push_str(&format!("Total time: {}s\n", secs(summary.elapsed)));

    for (section, records) in [
        (FAILED_HEADER, &summary.failed_tests),
        (TIMED_OUT_HEADER, &summary.timed_out_tests),
    ] {
        if records.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(section);
        out.push('\n');
        for record in records {
            out.push_str(&item(record));
        }
    }

    out.push_str(RULE);
    out.push_str("\n\n");
    out
}
