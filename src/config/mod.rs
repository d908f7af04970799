//! Configuration module
//!
//! Handles loading and managing configuration. Values are layered as
//! built-in defaults, then the config file, then `TORCH_TEST_RUNNER_*`
//! environment variables; command-line flags are applied last by the caller.

mod env;
mod file;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use env::EnvConfig;
pub use file::ConfigFile;

/// Test file exercised by default, relative to the PyTorch checkout
pub const DEFAULT_TEST_FILE: &str = "test/inductor/test_cuda_repro.py";

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Python interpreter used to launch the runner
    pub python: String,

    /// Test file, relative to the PyTorch path
    pub test_file: PathBuf,

    /// Per-test wall-clock bound in seconds
    pub per_test_timeout_secs: u64,

    /// Bound on the discovery invocation in seconds
    pub discovery_timeout_secs: u64,

    /// CSV column holding the test names
    pub csv_column: String,

    /// How long to wait for a killed process group to be reaped
    pub kill_grace_millis: u64,

    /// Extra environment for every runner invocation
    pub env: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut env = BTreeMap::new();
        env.insert("PYTORCH_TEST_WITH_ROCM".to_string(), "1".to_string());

        Self {
            python: "python".to_string(),
            test_file: PathBuf::from(DEFAULT_TEST_FILE),
            per_test_timeout_secs: 300,
            discovery_timeout_secs: 120,
            csv_column: "test_name".to_string(),
            kill_grace_millis: 500,
            env,
        }
    }
}

impl AppConfig {
    /// Apply environment overrides on top of this configuration
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(python) = &env.python {
            self.python = python.clone();
        }
        if let Some(test_file) = &env.test_file {
            self.test_file = PathBuf::from(test_file);
        }
        if let Some(timeout) = env.timeout.filter(|t| *t > 0) {
            self.per_test_timeout_secs = timeout;
        }
        self
    }
}
