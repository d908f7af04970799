//! External test runner
//!
//! The orchestrator never runs tests itself; it asks a [`TestHarness`] for the
//! command that runs one test (or lists all of them) and supervises that
//! process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::config::AppConfig;
use crate::models::{Mode, TestId};

/// Builds runner commands for the driver and the discovery resolver
pub trait TestHarness {
    /// Command running exactly one test
    fn test_command(&self, id: &TestId, mode: Mode) -> Command;

    /// Command printing every discoverable test, one per line
    fn discovery_command(&self) -> Command;
}

/// Runs a PyTorch unittest file with `python <file> -k <keyword>`
#[derive(Clone, Debug)]
pub struct PythonHarness {
    python: String,
    pytorch_path: PathBuf,
    test_file: PathBuf,
    env: BTreeMap<String, String>,
}

impl PythonHarness {
    pub fn new(config: &AppConfig, pytorch_path: impl Into<PathBuf>) -> Self {
        Self {
            python: config.python.clone(),
            pytorch_path: pytorch_path.into(),
            test_file: config.test_file.clone(),
            env: config.env.clone(),
        }
    }

    pub fn pytorch_path(&self) -> &Path {
        &self.pytorch_path
    }

    /// Absolute location of the test file
    pub fn test_file_path(&self) -> PathBuf {
        self.pytorch_path.join(&self.test_file)
    }

    /// `-k` argument for an identifier.
    ///
    /// A script run as `__main__` cannot take a full unittest id as a
    /// positional, so node ids are narrowed to their method name.
    pub fn keyword(id: &TestId, mode: Mode) -> &str {
        let id = id.as_str();
        if mode.is_node_id() {
            id.rsplit('.').next().unwrap_or(id)
        } else {
            id
        }
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.arg(self.test_file_path());
        cmd.envs(&self.env);
        cmd
    }
}

impl TestHarness for PythonHarness {
    fn test_command(&self, id: &TestId, mode: Mode) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-k").arg(Self::keyword(id, mode));
        cmd
    }

    fn discovery_command(&self) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("--discover-tests").current_dir(&self.pytorch_path);
        cmd
    }
}
