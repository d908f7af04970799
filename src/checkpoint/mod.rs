//! Checkpoint storage
//!
//! One checkpoint sidecar exists per log file (`<log>.checkpoint`). It is
//! rewritten after every test through a temp-file-and-rename so a crash can
//! never leave a half-written checkpoint behind. Anything that fails to parse
//! or validate on load is treated as "no checkpoint".

use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Mode, TestId};

/// Bumped whenever the on-disk layout changes
pub const CHECKPOINT_VERSION: u32 = 1;

const CHECKPOINT_SUFFIX: &str = ".checkpoint";

/// Checkpoint errors
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: atomicwrites::Error<serde_json::Error>,
    },

    #[error("failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed checkpoint {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to remove checkpoint {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Progress of a run after its most recently finished test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub last_test_run: TestId,
    /// `None` once the final test of the sequence has run
    pub next_test_to_run: Option<TestId>,
    pub last_index: usize,
    pub next_index: usize,
    pub total: usize,
    pub mode: Mode,
    pub csv_path: Option<PathBuf>,
    pub pytorch_path: PathBuf,
    pub updated: DateTime<Utc>,
}

impl Checkpoint {
    /// Checkpoint recorded after `tests[index]` finished.
    ///
    /// Panics if `index` is out of bounds.
    pub fn after(
        tests: &[TestId],
        index: usize,
        mode: Mode,
        csv_path: Option<&Path>,
        pytorch_path: &Path,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            last_test_run: tests[index].clone(),
            next_test_to_run: tests.get(index + 1).cloned(),
            last_index: index,
            next_index: index + 1,
            total: tests.len(),
            mode,
            csv_path: csv_path.map(Path::to_path_buf),
            pytorch_path: pytorch_path.to_path_buf(),
            updated: Utc::now(),
        }
    }

    /// Whether the run this checkpoint belongs to had no tests left
    pub fn is_complete(&self) -> bool {
        self.next_test_to_run.is_none()
    }

    /// Short human description used when reporting a stale checkpoint
    pub fn describe(&self) -> String {
        let next = self
            .next_test_to_run
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "(none)".to_string());
        format!(
            "last test = {} [{}/{}], next test = {}",
            self.last_test_run,
            self.last_index + 1,
            self.total,
            next
        )
    }

    fn validate(&self) -> Result<(), String> {
        if self.version != CHECKPOINT_VERSION {
            return Err(format!("unsupported version {}", self.version));
        }
        if self.next_index != self.last_index + 1 {
            return Err(format!(
                "next_index {} does not follow last_index {}",
                self.next_index, self.last_index
            ));
        }
        if self.next_index > self.total {
            return Err(format!(
                "next_index {} beyond total {}",
                self.next_index, self.total
            ));
        }
        if self.next_test_to_run.is_none() != (self.next_index == self.total) {
            return Err("next_test_to_run disagrees with next_index".to_string());
        }
        Ok(())
    }
}

/// Durable checkpoint file for one log path
#[derive(Clone, Debug)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store sitting next to `log_path`
    pub fn for_log(log_path: impl AsRef<Path>) -> Self {
        let mut path = log_path.as_ref().as_os_str().to_os_string();
        path.push(CHECKPOINT_SUFFIX);
        Self {
            path: PathBuf::from(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the checkpoint
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|f| serde_json::to_writer_pretty(f, checkpoint))
            .map_err(|source| CheckpointError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "Checkpoint saved: next_index={} ({})",
            checkpoint.next_index,
            self.path.display()
        );
        Ok(())
    }

    /// Read the checkpoint, distinguishing "missing" from "broken"
    pub fn read(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let checkpoint: Checkpoint =
            serde_json::from_str(&content).map_err(|e| CheckpointError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        checkpoint
            .validate()
            .map_err(|reason| CheckpointError::Malformed {
                path: self.path.clone(),
                reason,
            })?;

        Ok(Some(checkpoint))
    }

    /// Load the checkpoint; unreadable or malformed degrades to absent
    pub fn load(&self) -> Option<Checkpoint> {
        match self.read() {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                warn!("Ignoring checkpoint: {}", e);
                None
            }
        }
    }

    /// Remove the checkpoint; a missing file is not an error
    pub fn delete(&self) -> Result<(), CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Checkpoint removed: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CheckpointError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
