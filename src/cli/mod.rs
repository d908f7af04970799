//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use chrono::{DateTime, Local};
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Run PyTorch tests one process at a time, with checkpointing and reruns
#[derive(Parser, Debug)]
#[command(name = "torch-test-runner")]
#[command(version = "0.1.0")]
#[command(about = "Run PyTorch tests individually with timeouts, checkpoints and reruns")]
#[command(long_about = None)]
pub struct Args {
    /// CSV file listing the tests to run
    #[arg(value_name = "CSV_FILE")]
    pub csv_file: Option<PathBuf>,

    /// Discover and run every test in the test file
    #[arg(long)]
    pub all_tests: bool,

    /// Re-run the failed tests listed in a previous log
    #[arg(long, value_name = "LOG_FILE")]
    pub rerun_failed: Option<PathBuf>,

    /// With --rerun-failed, also re-run timed out tests
    #[arg(long)]
    pub rerun_include_timeouts: bool,

    /// PyTorch source checkout
    #[arg(long, value_name = "PATH")]
    pub pytorch_path: Option<PathBuf>,

    /// Log file (default: timestamped name in the current directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Stop at the first ERROR, FAILED or TIMEDOUT test
    #[arg(long)]
    pub stop_on_failure: bool,

    /// Wall-clock limit per test [default: 300]
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub per_test_timeout: Option<u64>,

    /// Continue from the checkpoint next to the log file
    #[arg(long)]
    pub resume: bool,

    /// Do not write or remove checkpoint files
    #[arg(long)]
    pub no_checkpoint: bool,

    /// With --all-tests, only run tests whose id matches this pattern
    #[arg(long, value_name = "PATTERN")]
    pub regex: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("specify one of: a CSV file, --all-tests, or --rerun-failed LOG_FILE")]
    NoSelection,

    #[error("only one of a CSV file, --all-tests and --rerun-failed may be given")]
    ConflictingSelection,

    #[error("--regex can only be used with --all-tests")]
    RegexWithoutAllTests,

    #[error("--pytorch-path is required (or set TORCH_TEST_RUNNER_PYTORCH_PATH)")]
    MissingPytorchPath,

    #[error("PyTorch path does not exist: {}", .0.display())]
    PytorchPathNotFound(PathBuf),

    #[error("test file not found: {}", .0.display())]
    TestFileNotFound(PathBuf),
}

/// Which tests the operator asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Csv(PathBuf),
    AllTests,
    Rerun(PathBuf),
}

impl Args {
    /// Exactly one selection, with its dependent flags checked
    pub fn selection(&self) -> Result<Selection, CliError> {
        let given = [
            self.csv_file.is_some(),
            self.all_tests,
            self.rerun_failed.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count();
        if given > 1 {
            return Err(CliError::ConflictingSelection);
        }
        if self.regex.is_some() && !self.all_tests {
            return Err(CliError::RegexWithoutAllTests);
        }

        match (&self.csv_file, self.all_tests, &self.rerun_failed) {
            (Some(path), _, _) => Ok(Selection::Csv(path.clone())),
            (_, true, _) => Ok(Selection::AllTests),
            (_, _, Some(log)) => Ok(Selection::Rerun(log.clone())),
            _ => Err(CliError::NoSelection),
        }
    }

    /// `--pytorch-path`, else the environment fallback
    pub fn pytorch_path(&self, from_env: Option<&str>) -> Result<PathBuf, CliError> {
        self.pytorch_path
            .clone()
            .or_else(|| from_env.map(PathBuf::from))
            .ok_or(CliError::MissingPytorchPath)
    }
}

/// Check the checkout and the test file before anything runs
pub fn validate_paths(pytorch_path: &Path, test_file: &Path) -> Result<(), CliError> {
    if !pytorch_path.is_dir() {
        return Err(CliError::PytorchPathNotFound(pytorch_path.to_path_buf()));
    }
    if !test_file.is_file() {
        return Err(CliError::TestFileNotFound(test_file.to_path_buf()));
    }
    Ok(())
}

/// Log file name used when `--log-file` is not given
pub fn default_log_file(selection: &Selection, now: DateTime<Local>) -> PathBuf {
    let stamp = now.format("%Y%m%d_%H%M%S");
    match selection {
        Selection::Rerun(source) => {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "test_results".to_string());
            PathBuf::from(format!("{stem}.rerun_{stamp}.log"))
        }
        _ => PathBuf::from(format!("test_results_{stamp}.log")),
    }
}
