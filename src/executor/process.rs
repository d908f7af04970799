//! Supervised runner processes
//!
//! Each runner is started in its own process group with piped output and a
//! hard wall-clock bound. When the bound expires, or the future is dropped,
//! the whole group is killed so no descendant outlives its test.

use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::classifier::ProcessReport;

/// Runner process errors
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// What a finished or killed runner left behind
#[derive(Clone, Debug)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration: Duration,
}

impl ProcessOutput {
    pub fn report(&self) -> ProcessReport<'_> {
        ProcessReport {
            exit_code: self.exit_code,
            stdout: &self.stdout,
            stderr: &self.stderr,
            timed_out: self.timed_out,
        }
    }
}

/// Kills the process group of a spawned child when dropped
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // ESRCH just means the group is already gone.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!("Output stream closed early: {}", e);
    }
    buf
}

async fn collect(handle: Option<JoinHandle<Vec<u8>>>, grace: Duration) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            debug!("Output reader failed: {}", e);
            String::new()
        }
        Err(_) => {
            debug!("Output still open {}ms after exit, dropping it", grace.as_millis());
            String::new()
        }
    }
}

/// Run `command` to completion or until `limit` expires.
///
/// `grace` bounds how long captured output is awaited once the process is
/// gone.
pub async fn run_with_timeout(
    mut command: Command,
    limit: Duration,
    grace: Duration,
) -> Result<ProcessOutput, SpawnError> {
    let program = command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let start = Instant::now();
    let mut child = command.spawn().map_err(|source| SpawnError::Launch {
        program: program.clone(),
        source,
    })?;
    let mut group = ProcessGroupGuard::new(child.id());

    let stdout = child.stdout.take().map(|s| tokio::spawn(read_all(s)));
    let stderr = child.stderr.take().map(|s| tokio::spawn(read_all(s)));

    let (exit_code, timed_out) = match tokio::time::timeout(limit, child.wait()).await {
        Ok(Ok(status)) => (status.code(), false),
        Ok(Err(source)) => return Err(SpawnError::Wait { program, source }),
        Err(_) => {
            warn!("{} exceeded {}s, killing process group", program, limit.as_secs());
            group.kill();
            if let Err(e) = child.kill().await {
                debug!("Kill after timeout: {}", e);
            }
            (None, true)
        }
    };
    let duration = start.elapsed();

    // Leftover descendants would otherwise keep the pipes (and the GPU) busy.
    group.kill();

    Ok(ProcessOutput {
        exit_code,
        stdout: collect(stdout, grace).await,
        stderr: collect(stderr, grace).await,
        timed_out,
        duration,
    })
}
