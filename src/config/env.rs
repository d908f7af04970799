//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "TORCH_TEST_RUNNER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Interpreter from TORCH_TEST_RUNNER_PYTHON
    pub python: Option<String>,
    /// Test file from TORCH_TEST_RUNNER_TEST_FILE
    pub test_file: Option<String>,
    /// Per-test timeout from TORCH_TEST_RUNNER_TIMEOUT
    pub timeout: Option<u64>,
    /// PyTorch checkout from TORCH_TEST_RUNNER_PYTORCH_PATH
    pub pytorch_path: Option<String>,
    /// Config file from TORCH_TEST_RUNNER_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            python: get_env("PYTHON"),
            test_file: get_env("TEST_FILE"),
            timeout: get_env_parse("TIMEOUT"),
            pytorch_path: get_env("PYTORCH_PATH"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.python.is_some()
            || self.test_file.is_some()
            || self.timeout.is_some()
            || self.pytorch_path.is_some()
            || self.config_file.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}
