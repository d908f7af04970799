//! torch-test-runner - resilient runner for slow, flaky PyTorch test files
//!
//! Runs every test of a PyTorch unittest file in its own process, one at a
//! time, under a hard per-test timeout. Progress is checkpointed after each
//! test so an interrupted run can be resumed, and the failures listed in a
//! run log can be re-run later.
//!
//! ## Usage
//!
//! ```bash
//! # Run the tests named in a CSV file
//! torch-test-runner failing.csv --pytorch-path ~/pytorch
//!
//! # Discover and run the whole file, only tests matching a pattern
//! torch-test-runner --all-tests --regex 'conv|mm' --pytorch-path ~/pytorch
//!
//! # Continue an interrupted run
//! torch-test-runner --all-tests --pytorch-path ~/pytorch --log-file run.log --resume
//!
//! # Re-run failures (and timeouts) from an earlier log
//! torch-test-runner --rerun-failed run.log --rerun-include-timeouts --pytorch-path ~/pytorch
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

mod checkpoint;
mod classifier;
mod cli;
mod config;
mod executor;
mod models;
mod resolver;
mod runlog;
mod utils;

use cli::{default_log_file, validate_paths, Args, Selection};
use config::{ConfigFile, EnvConfig};
use executor::{Driver, PythonHarness, RunOptions, RunPlan, Signals};
use resolver::{Resolution, TestSource};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(LogLevel::from_verbose(args.verbose));

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    let selection = args.selection()?;
    if args.rerun_include_timeouts && !matches!(selection, Selection::Rerun(_)) {
        warn!("--rerun-include-timeouts has no effect without --rerun-failed");
    }

    let env = EnvConfig::load();
    if env.has_any() {
        debug!("Environment overrides: {:?}", env);
    }

    let config_path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));
    let mut config = ConfigFile::resolve(config_path.as_deref())
        .context("Failed to load configuration")?
        .runner
        .with_env(&env);
    if let Some(secs) = args.per_test_timeout {
        config.per_test_timeout_secs = secs;
    }

    let pytorch_path = args.pytorch_path(env.pytorch_path.as_deref())?;
    let harness = PythonHarness::new(&config, pytorch_path);
    validate_paths(harness.pytorch_path(), &harness.test_file_path())?;

    let source = match &selection {
        Selection::Csv(path) => TestSource::Csv {
            path: path.clone(),
            column: config.csv_column.clone(),
        },
        Selection::AllTests => TestSource::full_suite(args.regex.as_deref())?,
        Selection::Rerun(log) => TestSource::Rerun {
            log: log.clone(),
            include_timeouts: args.rerun_include_timeouts,
        },
    };

    let grace = Duration::from_millis(config.kill_grace_millis);
    let resolved = match source
        .resolve(
            &harness,
            Duration::from_secs(config.discovery_timeout_secs),
            grace,
        )
        .await?
    {
        Resolution::Run(resolved) => resolved,
        Resolution::Nothing(messages) => {
            for message in messages {
                println!("{message}");
            }
            return Ok(0);
        }
    };

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| default_log_file(&selection, Local::now()));
    info!(
        "Running {} test(s) in {} mode, logging to {}",
        resolved.tests.len(),
        resolved.mode,
        log_path.display()
    );

    let options = RunOptions {
        per_test_timeout: Duration::from_secs(config.per_test_timeout_secs),
        kill_grace: grace,
        stop_on_failure: args.stop_on_failure,
        resume: args.resume,
        checkpoint: !args.no_checkpoint,
        echo: true,
    };
    let plan = RunPlan {
        resolved,
        log_path,
        pytorch_path: harness.pytorch_path().to_path_buf(),
    };

    // Ctrl-C keeps its default action until execution starts.
    let signals = match Signals::new() {
        Ok(signals) => Some(signals),
        Err(e) => {
            warn!("Cannot install signal handlers: {}", e);
            None
        }
    };

    let report = Driver::new(harness, options)
        .run(&plan, shutdown_signal(signals))
        .await?;
    info!(
        "Finished {:?}: {} test(s) run starting at index {}",
        report.state,
        report.record.len(),
        report.start_index
    );
    println!("Log saved to: {}", plan.log_path.display());

    Ok(report.exit_code())
}

/// Resolves on SIGINT, SIGTERM or SIGHUP; never resolves without handlers
async fn shutdown_signal(signals: Option<Signals>) {
    if let Some(mut signals) = signals {
        if let Some(signal) = signals.recv().await {
            warn!("Received {}, stopping the run", signal);
            return;
        }
    }
    std::future::pending::<()>().await
}
