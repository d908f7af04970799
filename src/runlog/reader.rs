//! Run log reader
//!
//! Recovers the mode and the failed / timed-out identifiers from a previous
//! run's log. Test output may be interleaved anywhere, so only the `Mode:`
//! line and the item lines directly under a summary section header count.

use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use super::format::{FAILED_HEADER, MODE_PREFIX, TIMED_OUT_HEADER};
use crate::models::{Mode, TestId};

/// Rerun log errors
#[derive(Error, Debug)]
pub enum RerunLogError {
    #[error("log file not found or could not be read: {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log file {path} has no 'Mode: full_suite' or 'Mode: csv' line")]
    MissingMode { path: PathBuf },
}

/// What a previous run left to retry
#[derive(Clone, Debug, PartialEq)]
pub struct RerunSource {
    pub mode: Mode,
    pub failed: Vec<TestId>,
    pub timed_out: Vec<TestId>,
}

impl RerunSource {
    /// Identifiers to rerun: failed first, then timed out when requested,
    /// each at its first appearance only
    pub fn select(&self, include_timeouts: bool) -> Vec<TestId> {
        let mut seen = HashSet::new();
        let timed_out: &[TestId] = if include_timeouts {
            &self.timed_out
        } else {
            &[]
        };
        self.failed
            .iter()
            .chain(timed_out)
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Failed,
    TimedOut,
}

fn mode_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^{MODE_PREFIX}\s*(full_suite|csv)\s*$"))
            .expect("mode line pattern is valid")
    })
}

fn item_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s+-\s+(.+?)\s+\(\d+\.\d+s\)\s*$").expect("item line pattern is valid")
    })
}

/// First `Mode:` line in the log
pub fn parse_mode(content: &str) -> Option<Mode> {
    content.lines().find_map(|line| {
        mode_line()
            .captures(line.trim())
            .and_then(|c| c[1].parse().ok())
    })
}

/// Parse log text; `path` is only used for error messages
pub fn parse_log(content: &str, path: &Path) -> Result<RerunSource, RerunLogError> {
    let mode = parse_mode(content).ok_or_else(|| RerunLogError::MissingMode {
        path: path.to_path_buf(),
    })?;

    let mut failed = Vec::new();
    let mut timed_out = Vec::new();
    let mut section = None;

    for line in content.lines() {
        match line.trim() {
            FAILED_HEADER => {
                section = Some(Section::Failed);
                continue;
            }
            TIMED_OUT_HEADER => {
                section = Some(Section::TimedOut);
                continue;
            }
            _ => {}
        }

        let Some(current) = section else {
            continue;
        };

        match item_line().captures(line) {
            Some(caps) => {
                let id = TestId::new(caps[1].trim());
                match current {
                    Section::Failed => failed.push(id),
                    Section::TimedOut => timed_out.push(id),
                }
            }
            // Blank line, rule or stray output ends the section.
            None => section = None,
        }
    }

    Ok(RerunSource {
        mode,
        failed,
        timed_out,
    })
}

pub fn read_log(path: impl AsRef<Path>) -> Result<RerunSource, RerunLogError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| RerunLogError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_log(&content, path)
}
