//! Rerun selection from a previous run's log

use std::path::Path;
use tracing::info;

use super::{ResolveError, Resolution, ResolvedTests, SourceKind};
use crate::runlog::read_log;

/// Failed (and optionally timed-out) tests of `log`, in first-appearance order
pub fn resolve_rerun(log: &Path, include_timeouts: bool) -> Result<Resolution, ResolveError> {
    let source = read_log(log)?;
    let tests = source.select(include_timeouts);
    info!(
        "Rerun source {}: mode {}, {} failed, {} timed out",
        log.display(),
        source.mode,
        source.failed.len(),
        source.timed_out.len()
    );

    if tests.is_empty() {
        let mut message = "No failed tests to re-run.".to_string();
        if !source.timed_out.is_empty() && !include_timeouts {
            message.push_str(" (Use --rerun-include-timeouts to also re-run timed out tests.)");
        }
        return Ok(Resolution::Nothing(vec![message]));
    }

    let mut notes = vec![format!("Re-running failed tests from: {}", log.display())];
    if include_timeouts && !source.timed_out.is_empty() {
        notes.push(format!(
            "Including {} timed out test(s).",
            source.timed_out.len()
        ));
    }
    notes.push(format!("Re-running {} test(s)", tests.len()));

    Ok(Resolution::Run(ResolvedTests {
        kind: SourceKind::Rerun,
        mode: source.mode,
        tests,
        notes,
        csv_path: None,
    }))
}
