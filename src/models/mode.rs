//! Run mode and test identifier models
//!
//! A run is either driven by a CSV list of keyword filters or by discovery of
//! every node id in the suite. The mode is fixed for the lifetime of a run and
//! is persisted so a later rerun can reinterpret the identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the identifiers of a run are to be interpreted by the runner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Identifiers are keyword filters read from a CSV column
    Csv,
    /// Identifiers are structural node ids produced by discovery
    FullSuite,
}

impl Mode {
    /// Tag used in the log's `Mode:` line and in checkpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Csv => "csv",
            Mode::FullSuite => "full_suite",
        }
    }

    /// Whether identifiers are node ids rather than keyword expressions
    pub fn is_node_id(&self) -> bool {
        matches!(self, Mode::FullSuite)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "csv" => Ok(Mode::Csv),
            "full_suite" => Ok(Mode::FullSuite),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Opaque name of one test case in the runner's vocabulary
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
