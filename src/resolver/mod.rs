//! Test source resolution
//!
//! Turns the operator's selection (a CSV list, the whole suite, or the
//! failures of an earlier log) into an ordered sequence of identifiers plus
//! the mode they are to be run in.

mod csv;
mod rerun;
mod suite;

use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::executor::TestHarness;
use crate::models::{Mode, TestId};
use crate::runlog::RerunLogError;

pub use self::csv::read_csv;
pub use rerun::resolve_rerun;
pub use suite::{discover, filter_tests};

/// Resolution errors; all of them abort the run before execution
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to read CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    #[error("CSV file {path} must have a '{column}' column (found: {})", .found.join(", "))]
    MissingColumn {
        path: PathBuf,
        column: String,
        found: Vec<String>,
    },

    #[error("no tests found in CSV file {0}")]
    EmptyCsv(PathBuf),

    #[error("CSV file {path} has a test name spanning several lines: {name:?}")]
    MultilineName { path: PathBuf, name: String },

    #[error("invalid --regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("test discovery failed: {0}")]
    Discovery(String),

    #[error(transparent)]
    RerunLog(#[from] RerunLogError),
}

/// Where the identifiers of a run come from
#[derive(Clone, Debug)]
pub enum TestSource {
    Csv { path: PathBuf, column: String },
    FullSuite { filter: Option<Regex> },
    Rerun { log: PathBuf, include_timeouts: bool },
}

impl TestSource {
    pub fn full_suite(pattern: Option<&str>) -> Result<Self, ResolveError> {
        let filter = pattern.map(Regex::new).transpose()?;
        Ok(TestSource::FullSuite { filter })
    }

    /// Resolve into a runnable sequence or a clean no-op
    pub async fn resolve<H: TestHarness>(
        &self,
        harness: &H,
        discovery_timeout: Duration,
        grace: Duration,
    ) -> Result<Resolution, ResolveError> {
        match self {
            TestSource::Csv { path, column } => {
                let tests = read_csv(path, column)?;
                Ok(Resolution::Run(ResolvedTests {
                    kind: SourceKind::Csv,
                    mode: Mode::Csv,
                    notes: vec![
                        format!("Reading tests from: {}", path.display()),
                        format!("Found {} test(s) to run", tests.len()),
                    ],
                    tests,
                    csv_path: Some(path.clone()),
                }))
            }
            TestSource::FullSuite { filter } => {
                let discovered = discover(harness, discovery_timeout, grace).await?;
                let mut notes = vec![format!("Discovered {} test(s)", discovered.len())];

                let tests = match filter {
                    Some(re) => {
                        let filtered = filter_tests(discovered, re);
                        notes.push(format!(
                            "{} test(s) match --regex '{}'",
                            filtered.len(),
                            re.as_str()
                        ));
                        if filtered.is_empty() {
                            return Ok(Resolution::Nothing(notes));
                        }
                        filtered
                    }
                    None => discovered,
                };

                Ok(Resolution::Run(ResolvedTests {
                    kind: SourceKind::FullSuite,
                    mode: Mode::FullSuite,
                    tests,
                    notes,
                    csv_path: None,
                }))
            }
            TestSource::Rerun {
                log,
                include_timeouts,
            } => resolve_rerun(log, *include_timeouts),
        }
    }
}

/// Which resolver produced a sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    FullSuite,
    Rerun,
}

impl SourceKind {
    pub fn summary_title(&self) -> &'static str {
        match self {
            SourceKind::Csv => "TEST SUMMARY",
            SourceKind::FullSuite => "TEST SUMMARY (full suite)",
            SourceKind::Rerun => "TEST SUMMARY (rerun failed)",
        }
    }
}

/// An ordered, immutable test sequence
#[derive(Clone, Debug)]
pub struct ResolvedTests {
    pub kind: SourceKind,
    pub mode: Mode,
    pub tests: Vec<TestId>,
    /// Informational lines for the log, written after its header
    pub notes: Vec<String>,
    pub csv_path: Option<PathBuf>,
}

/// Outcome of resolution
#[derive(Clone, Debug)]
pub enum Resolution {
    Run(ResolvedTests),
    /// Nothing to execute; not an error. Carries the messages to report.
    Nothing(Vec<String>),
}
