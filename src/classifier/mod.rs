//! Outcome classification
//!
//! Maps a finished (or killed) runner process to exactly one [`Outcome`].
//! All free-form output sniffing lives here, behind [`classify`].

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Outcome;

/// Everything the classifier looks at for one test
#[derive(Clone, Copy, Debug)]
pub struct ProcessReport<'a> {
    pub exit_code: Option<i32>,
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub timed_out: bool,
}

/// Marker that turns a zero exit into SKIPPED
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipMarker {
    /// `SKIPPED` / `skipped` as a status word, not preceded by a count
    StatusWord,
    /// `N skipped` with N >= 1, as printed by pytest's final line
    SkipCount,
    /// unittest's `OK (skipped=N)`
    UnittestOk,
}

impl SkipMarker {
    pub fn all() -> [SkipMarker; 3] {
        [
            SkipMarker::StatusWord,
            SkipMarker::SkipCount,
            SkipMarker::UnittestOk,
        ]
    }

    fn pattern(&self) -> &'static Regex {
        static STATUS_WORD: OnceLock<Regex> = OnceLock::new();
        static SKIP_COUNT: OnceLock<Regex> = OnceLock::new();
        static UNITTEST_OK: OnceLock<Regex> = OnceLock::new();

        let (cell, src) = match self {
            SkipMarker::StatusWord => (&STATUS_WORD, r"(?im)(?:^|[^0-9\s])[ \t]*\bskipped\b"),
            SkipMarker::SkipCount => (&SKIP_COUNT, r"(?i)\b0*[1-9][0-9]* skipped\b"),
            SkipMarker::UnittestOk => (&UNITTEST_OK, r"OK \(skipped="),
        };
        cell.get_or_init(|| Regex::new(src).expect("skip marker pattern is valid"))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern().is_match(text)
    }
}

/// Substring in the output of a non-zero exit that marks harness breakage
const ERROR_MARKER: &str = "RuntimeError";

/// Returns the first skip marker found in either stream
pub fn find_skip_marker(stdout: &str, stderr: &str) -> Option<SkipMarker> {
    SkipMarker::all()
        .into_iter()
        .find(|m| m.matches(stdout) || m.matches(stderr))
}

/// Classify a process report; first matching rule wins.
pub fn classify(report: &ProcessReport<'_>) -> Outcome {
    if report.timed_out {
        return Outcome::TimedOut;
    }

    if report.exit_code == Some(0) {
        return if find_skip_marker(report.stdout, report.stderr).is_some() {
            Outcome::Skipped
        } else {
            Outcome::Passed
        };
    }

    if report.stdout.contains(ERROR_MARKER) || report.stderr.contains(ERROR_MARKER) {
        Outcome::Error
    } else {
        Outcome::Failed
    }
}
