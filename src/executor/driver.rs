//! Execution driver
//!
//! Runs a resolved sequence strictly one test at a time, classifying each
//! runner process, appending to the run log and checkpointing after every
//! test. All per-run state lives in a [`RunContext`] owned by the loop.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::harness::TestHarness;
use super::process::run_with_timeout;
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::classifier::classify;
use crate::models::{Mode, Outcome, RunRecord, Summary, TestId, TestRecord};
use crate::resolver::ResolvedTests;
use crate::runlog::LogWriter;
use crate::utils::Timer;

/// Driver settings taken from the command line and configuration
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub per_test_timeout: Duration,
    pub kill_grace: Duration,
    pub stop_on_failure: bool,
    pub resume: bool,
    pub checkpoint: bool,
    /// Mirror the log to stdout
    pub echo: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            per_test_timeout: Duration::from_secs(300),
            kill_grace: Duration::from_millis(500),
            stop_on_failure: false,
            resume: false,
            checkpoint: true,
            echo: true,
        }
    }
}

/// Everything one run needs besides the harness
#[derive(Clone, Debug)]
pub struct RunPlan {
    pub resolved: ResolvedTests,
    pub log_path: PathBuf,
    pub pytorch_path: PathBuf,
}

/// Why a run stopped before the end of its sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbortReason {
    StopOnFailure(TestId),
    Interrupted,
}

/// Run-level state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    Executing,
    Completed,
    Aborted(AbortReason),
}

/// Where execution begins, and what to tell the operator about it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartPoint {
    pub index: usize,
    pub resumed: bool,
    pub messages: Vec<String>,
}

impl StartPoint {
    fn fresh(message: Option<String>) -> Self {
        Self {
            index: 0,
            resumed: false,
            messages: message.into_iter().collect(),
        }
    }
}

/// Mutable state of one run
#[derive(Debug)]
pub struct RunContext {
    pub mode: Mode,
    pub tests: Vec<TestId>,
    pub index: usize,
    pub state: RunState,
    pub record: RunRecord,
}

impl RunContext {
    pub fn new(mode: Mode, tests: Vec<TestId>) -> Self {
        Self {
            mode,
            tests,
            index: 0,
            state: RunState::Initializing,
            record: RunRecord::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.tests.len()
    }
}

/// Result of a run that reached execution
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub start_index: usize,
    pub record: RunRecord,
    pub summary: Summary,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        match self.state {
            RunState::Aborted(AbortReason::Interrupted) => 1,
            _ => self.summary.exit_code(),
        }
    }
}

/// Decide the start index from the checkpoint for this log.
///
/// Without `--resume` a leftover checkpoint is reported, never used.
pub fn start_point(store: &CheckpointStore, options: &RunOptions, ctx: &RunContext) -> StartPoint {
    if options.resume {
        let Some(cp) = store.load() else {
            return StartPoint::fresh(Some(
                "No checkpoint found, starting from first test.".to_string(),
            ));
        };
        if cp.mode != ctx.mode {
            return StartPoint::fresh(Some(format!(
                "Checkpoint is for mode {}, this run is {}; starting from first test.",
                cp.mode, ctx.mode
            )));
        }
        let next = match cp.next_test_to_run.as_ref() {
            Some(next) if !cp.is_complete() => next,
            _ => {
                return StartPoint::fresh(Some(
                    "Checkpoint shows previous run completed (no next test). Starting from first test."
                        .to_string(),
                ))
            }
        };

        let index = if ctx.tests.get(cp.next_index) == Some(next) {
            Some(cp.next_index)
        } else {
            ctx.tests.iter().position(|t| t == next)
        };

        return match index {
            Some(index) => StartPoint {
                index,
                resumed: index > 0,
                messages: vec![format!(
                    "Resuming from test: {} [{}/{}]",
                    next,
                    index + 1,
                    ctx.total()
                )],
            },
            None => StartPoint::fresh(Some(format!(
                "Checkpoint next test {next} is not in the test list, starting from first test."
            ))),
        };
    }

    if options.checkpoint {
        if let Some(cp) = store.load() {
            return StartPoint::fresh(Some(format!(
                "Checkpoint from previous run: {}. Use --resume to continue from next test.",
                cp.describe()
            )));
        }
    }

    StartPoint::fresh(None)
}

/// Sequential test driver
pub struct Driver<H> {
    harness: H,
    options: RunOptions,
}

impl<H: TestHarness> Driver<H> {
    pub fn new(harness: H, options: RunOptions) -> Self {
        Self { harness, options }
    }

    /// Run `plan` until the sequence is exhausted, a failure stops it, or
    /// `shutdown` resolves.
    pub async fn run<F>(&self, plan: &RunPlan, shutdown: F) -> Result<RunReport>
    where
        F: Future<Output = ()>,
    {
        let resolved = &plan.resolved;
        let store = CheckpointStore::for_log(&plan.log_path);
        debug!("Checkpoint file: {}", store.path().display());
        let mut ctx = RunContext::new(resolved.mode, resolved.tests.clone());

        let start = start_point(&store, &self.options, &ctx);
        if self.options.checkpoint && start.index == 0 {
            if let Err(e) = store.delete() {
                warn!("{}", e);
            }
        }

        let mut log = if start.resumed {
            LogWriter::append(&plan.log_path)
        } else {
            LogWriter::create(&plan.log_path)
        }
        .with_context(|| format!("Failed to open log file {}", plan.log_path.display()))?;
        if !self.options.echo {
            log = log.quiet();
        }

        log.header(&plan.pytorch_path, ctx.mode)?;
        for line in resolved.notes.iter().chain(&start.messages) {
            log.line(line)?;
        }
        log.line(&format!(
            "Per-test timeout: {}s\n",
            self.options.per_test_timeout.as_secs()
        ))?;

        ctx.index = start.index;
        ctx.state = RunState::Executing;
        let timer = Timer::start("run");

        tokio::pin!(shutdown);
        while ctx.index < ctx.total() {
            let i = ctx.index;
            let id = ctx.tests[i].clone();
            log.test_start(i + 1, ctx.total(), &id)?;

            let finished = tokio::select! {
                record = self.run_one(&id, ctx.mode, &mut log) => Some(record?),
                () = &mut shutdown => None,
            };
            let Some(record) = finished else {
                log.line("\nInterrupted; current test not recorded.")?;
                ctx.state = RunState::Aborted(AbortReason::Interrupted);
                break;
            };

            let failed = record.outcome.is_failure();
            ctx.record.push(record);
            ctx.index = i + 1;

            if self.options.checkpoint {
                let checkpoint = Checkpoint::after(
                    &ctx.tests,
                    i,
                    ctx.mode,
                    resolved.csv_path.as_deref(),
                    &plan.pytorch_path,
                );
                if let Err(e) = store.save(&checkpoint) {
                    warn!("{}", e);
                }
            }

            if failed && self.options.stop_on_failure {
                log.line(&format!("\nStopping due to test failure: {id}"))?;
                ctx.state = RunState::Aborted(AbortReason::StopOnFailure(id));
                break;
            }
        }

        if ctx.state == RunState::Executing {
            ctx.state = RunState::Completed;
        }

        let summary = ctx.record.summary(timer.stop());
        log.summary(&summary_title(resolved.kind.summary_title(), &ctx.state), &summary)?;

        if ctx.state == RunState::Completed && self.options.checkpoint {
            if let Err(e) = store.delete() {
                warn!("{}", e);
            }
        }

        info!(
            "Run {:?}: {} executed, {} failing",
            ctx.state,
            ctx.record.len(),
            summary.failures()
        );

        Ok(RunReport {
            state: ctx.state,
            start_index: start.index,
            record: ctx.record,
            summary,
        })
    }

    /// Execute one test; collaborator failures become an ERROR outcome
    async fn run_one(&self, id: &TestId, mode: Mode, log: &mut LogWriter) -> Result<TestRecord> {
        let command = self.harness.test_command(id, mode);
        let timer = Timer::start(id.as_str());

        match run_with_timeout(command, self.options.per_test_timeout, self.options.kill_grace).await
        {
            Ok(output) => {
                log.test_output(&output.stdout, &output.stderr)?;
                let outcome = classify(&output.report());
                debug!("{} -> {:?} (exit {:?})", id, outcome, output.exit_code);

                let record = TestRecord::new(id.clone(), outcome, output.duration);
                let limit = (outcome == Outcome::TimedOut).then_some(self.options.per_test_timeout);
                log.test_status(&record, limit, None)?;
                Ok(record)
            }
            Err(e) => {
                warn!("{}: {}", id, e);
                let record = TestRecord::new(id.clone(), Outcome::Error, timer.elapsed());
                log.test_status(&record, None, Some(&e.to_string()))?;
                Ok(record)
            }
        }
    }
}

fn summary_title(base: &str, state: &RunState) -> String {
    match state {
        RunState::Aborted(AbortReason::StopOnFailure(_)) => format!("{base} - stopped on failure"),
        RunState::Aborted(AbortReason::Interrupted) => format!("{base} - interrupted"),
        _ => base.to_string(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    #[cfg(target_os = "linux")]
    use crate::executor::Signals;
    use crate::resolver::SourceKind;
    use crate::runlog::read_log;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};
    use tokio::process::Command;

    /// Maps test ids to shell snippets
    struct ScriptHarness {
        scripts: HashMap<String, String>,
    }

    impl ScriptHarness {
        fn new(scripts: &[(&str, &str)]) -> Self {
            Self {
                scripts: scripts
                    .iter()
                    .map(|(id, s)| (id.to_string(), s.to_string()))
                    .collect(),
            }
        }
    }

    impl TestHarness for ScriptHarness {
        fn test_command(&self, id: &TestId, _mode: Mode) -> Command {
            let script = self
                .scripts
                .get(id.as_str())
                .cloned()
                .unwrap_or_else(|| "exit 0".to_string());
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(script);
            cmd
        }

        fn discovery_command(&self) -> Command {
            Command::new("true")
        }
    }

    fn has_checkpoint(log_path: &Path) -> bool {
        CheckpointStore::for_log(log_path).load().is_some()
    }

    const PASS: &str = "echo 'Ran 1 test'; echo OK";
    const FAIL: &str = "echo 'AssertionError' >&2; exit 1";

    fn plan(dir: &TempDir, ids: &[&str]) -> RunPlan {
        RunPlan {
            resolved: ResolvedTests {
                kind: SourceKind::Csv,
                mode: Mode::Csv,
                tests: ids.iter().map(|i| TestId::from(*i)).collect(),
                notes: vec!["Reading tests from: tests.csv".to_string()],
                csv_path: Some(PathBuf::from("tests.csv")),
            },
            log_path: dir.path().join("run.log"),
            pytorch_path: PathBuf::from("/pytorch"),
        }
    }

    fn options() -> RunOptions {
        RunOptions {
            per_test_timeout: Duration::from_secs(10),
            echo: false,
            ..Default::default()
        }
    }

    fn outcomes(report: &RunReport) -> Vec<(String, Outcome)> {
        report
            .record
            .records()
            .iter()
            .map(|r| (r.id.to_string(), r.outcome))
            .collect()
    }

    async fn run(harness: ScriptHarness, options: RunOptions, plan: &RunPlan) -> RunReport {
        Driver::new(harness, options)
            .run(plan, std::future::pending())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_classifies_every_outcome() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["pass", "skip", "error", "fail", "hang"]);
        let harness = ScriptHarness::new(&[
            ("pass", PASS),
            ("skip", "echo 'OK (skipped=1)'"),
            ("error", "echo 'RuntimeError: HIP error' >&2; exit 1"),
            ("fail", FAIL),
            ("hang", "sleep 30"),
        ]);
        let options = RunOptions {
            per_test_timeout: Duration::from_millis(300),
            ..options()
        };

        let report = run(harness, options, &plan).await;
        assert_eq!(report.state, RunState::Completed);
        assert_eq!(
            outcomes(&report),
            vec![
                ("pass".to_string(), Outcome::Passed),
                ("skip".to_string(), Outcome::Skipped),
                ("error".to_string(), Outcome::Error),
                ("fail".to_string(), Outcome::Failed),
                ("hang".to_string(), Outcome::TimedOut),
            ]
        );
        assert_eq!(report.exit_code(), 1);
        assert!(!has_checkpoint(&plan.log_path));

        let log = fs::read_to_string(&plan.log_path).unwrap();
        assert!(log.contains("Mode: csv"));
        assert!(log.contains("Running: hang"));
        assert!(log.contains("✗ TIMEDOUT"));
        assert!(log.contains("RuntimeError: HIP error"));

        let source = read_log(&plan.log_path).unwrap();
        assert_eq!(source.mode, Mode::Csv);
        assert_eq!(
            source.failed.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            vec!["error", "fail"]
        );
        assert_eq!(
            source.timed_out.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            vec!["hang"]
        );
    }

    #[tokio::test]
    async fn test_passed_and_skipped_exit_zero() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a", "b"]);
        let harness = ScriptHarness::new(&[("a", PASS), ("b", "echo '1 skipped'")]);

        let report = run(harness, options(), &plan).await;
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_empty_sequence_completes() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &[]);
        let report = run(ScriptHarness::new(&[]), options(), &plan).await;
        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_stop_on_failure_keeps_checkpoint() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["t1", "t2", "t3", "t4", "t5"]);
        let scripts = [("t3", FAIL)];

        let stopping = RunOptions {
            stop_on_failure: true,
            ..options()
        };
        let report = run(ScriptHarness::new(&scripts), stopping, &plan).await;
        assert_eq!(report.record.len(), 3);
        assert_eq!(
            report.state,
            RunState::Aborted(AbortReason::StopOnFailure(TestId::from("t3")))
        );
        let cp = CheckpointStore::for_log(&plan.log_path).load().unwrap();
        assert_eq!(cp.next_index, 3);
        assert_eq!(cp.next_test_to_run, Some(TestId::from("t4")));
        assert!(fs::read_to_string(&plan.log_path)
            .unwrap()
            .contains("TEST SUMMARY - stopped on failure"));

        // Without the flag a fresh run goes all the way.
        let report = run(ScriptHarness::new(&scripts), options(), &plan).await;
        assert_eq!(report.record.len(), 5);
        assert!(!has_checkpoint(&plan.log_path));
    }

    #[tokio::test]
    async fn test_skipped_does_not_stop() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["s", "p"]);
        let options = RunOptions {
            stop_on_failure: true,
            ..options()
        };
        let report = run(ScriptHarness::new(&[("s", "echo SKIPPED")]), options, &plan).await;
        assert_eq!(report.record.len(), 2);
        assert_eq!(report.state, RunState::Completed);
    }

    #[tokio::test]
    async fn test_resume_continues_past_stop() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["t1", "t2", "t3", "t4", "t5"]);
        let scripts = [("t3", FAIL)];

        let stopping = RunOptions {
            stop_on_failure: true,
            ..options()
        };
        run(ScriptHarness::new(&scripts), stopping, &plan).await;

        let resuming = RunOptions {
            resume: true,
            ..options()
        };
        let report = run(ScriptHarness::new(&scripts), resuming, &plan).await;
        assert_eq!(report.start_index, 3);
        assert_eq!(
            report
                .record
                .records()
                .iter()
                .map(|r| r.id.as_str())
                .collect::<Vec<_>>(),
            vec!["t4", "t5"]
        );
        assert_eq!(report.state, RunState::Completed);
        assert!(!has_checkpoint(&plan.log_path));

        // Appended log keeps the failure from the first segment.
        let log = fs::read_to_string(&plan.log_path).unwrap();
        assert!(log.contains("Resuming from test: t4 [4/5]"));
        let source = read_log(&plan.log_path).unwrap();
        assert_eq!(source.select(true), vec![TestId::from("t3")]);
    }

    #[tokio::test]
    async fn test_resume_suffix_matches_fresh_run_from_same_index() {
        let dir = tempdir().unwrap();
        let ids = ["a", "b", "c", "d"];
        let scripts = [("b", FAIL), ("d", "echo '2 skipped'")];
        let plan = plan(&dir, &ids);

        let store = CheckpointStore::for_log(&plan.log_path);
        let tests: Vec<TestId> = ids.iter().map(|i| TestId::from(*i)).collect();
        let cp = Checkpoint::after(&tests, 0, Mode::Csv, None, Path::new("/pytorch"));
        store.save(&cp).unwrap();

        let resuming = RunOptions {
            resume: true,
            ..options()
        };
        let resumed = run(ScriptHarness::new(&scripts), resuming, &plan).await;

        let other = tempdir().unwrap();
        let fresh_plan = self::plan(&other, &ids[1..]);
        let fresh = run(ScriptHarness::new(&scripts), options(), &fresh_plan).await;

        assert_eq!(resumed.start_index, 1);
        assert_eq!(outcomes(&resumed), outcomes(&fresh));
    }

    #[tokio::test]
    async fn test_stale_checkpoint_reported_and_discarded() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a", "b", "c"]);
        let store = CheckpointStore::for_log(&plan.log_path);
        let cp = Checkpoint::after(
            &plan.resolved.tests,
            0,
            Mode::Csv,
            None,
            Path::new("/pytorch"),
        );
        store.save(&cp).unwrap();

        let report = run(ScriptHarness::new(&[]), options(), &plan).await;
        assert_eq!(report.start_index, 0);
        assert_eq!(report.record.len(), 3);
        let log = fs::read_to_string(&plan.log_path).unwrap();
        assert!(log.contains("Checkpoint from previous run: last test = a [1/3], next test = b"));
    }

    #[tokio::test]
    async fn test_resume_without_checkpoint_starts_fresh() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a"]);
        let options = RunOptions {
            resume: true,
            ..options()
        };
        let report = run(ScriptHarness::new(&[]), options, &plan).await;
        assert_eq!(report.start_index, 0);
        assert!(fs::read_to_string(&plan.log_path)
            .unwrap()
            .contains("No checkpoint found, starting from first test."));
    }

    #[tokio::test]
    async fn test_no_checkpoint_writes_nothing() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a", "b"]);
        let options = RunOptions {
            checkpoint: false,
            stop_on_failure: true,
            ..options()
        };
        let report = run(ScriptHarness::new(&[("a", FAIL)]), options, &plan).await;
        assert_eq!(report.record.len(), 1);
        assert!(!CheckpointStore::for_log(&plan.log_path).path().exists());
    }

    #[tokio::test]
    async fn test_launch_failure_is_error_outcome() {
        struct Broken;
        impl TestHarness for Broken {
            fn test_command(&self, _id: &TestId, _mode: Mode) -> Command {
                Command::new("/definitely/not/a/python")
            }
            fn discovery_command(&self) -> Command {
                Command::new("true")
            }
        }

        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a", "b"]);
        let report = Driver::new(Broken, options())
            .run(&plan, std::future::pending())
            .await
            .unwrap();
        assert_eq!(report.summary.errors, 2);
        assert_eq!(report.state, RunState::Completed);
        assert!(fs::read_to_string(&plan.log_path)
            .unwrap()
            .contains("✗ ERROR (0."));
    }

    #[tokio::test]
    async fn test_interrupt_keeps_progress() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a", "slow", "c"]);
        let harness = ScriptHarness::new(&[("slow", "sleep 30")]);

        let report = Driver::new(harness, options())
            .run(&plan, tokio::time::sleep(Duration::from_millis(500)))
            .await
            .unwrap();
        assert_eq!(report.state, RunState::Aborted(AbortReason::Interrupted));
        assert_eq!(report.record.len(), 1);
        assert_eq!(report.exit_code(), 1);

        let cp = CheckpointStore::for_log(&plan.log_path).load().unwrap();
        assert_eq!(cp.next_test_to_run, Some(TestId::from("slow")));
        assert!(fs::read_to_string(&plan.log_path)
            .unwrap()
            .contains("TEST SUMMARY - interrupted"));
    }

    /// Live and not yet a zombie
    #[cfg(target_os = "linux")]
    fn is_running(pid: i32) -> bool {
        match fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .map(|rest| !rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_sigterm_stops_run_and_kills_runner() {
        let dir = tempdir().unwrap();
        let plan = plan(&dir, &["a", "slow", "c"]);
        let pid_file = dir.path().join("runner.pid");
        let slow = format!("sleep 30 & echo $! > {}; wait", pid_file.display());
        let harness = ScriptHarness::new(&[("slow", slow.as_str())]);

        let mut signals = Signals::new().unwrap();
        let started = pid_file.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                if started.exists() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            unsafe {
                libc::kill(libc::getpid(), libc::SIGTERM);
            }
        });

        let report = Driver::new(harness, options())
            .run(&plan, async move {
                signals.recv().await;
            })
            .await
            .unwrap();
        assert_eq!(report.state, RunState::Aborted(AbortReason::Interrupted));
        assert_eq!(report.record.len(), 1);
        assert!(fs::read_to_string(&plan.log_path)
            .unwrap()
            .contains("TEST SUMMARY - interrupted"));

        // The backgrounded sleep belongs to the runner's group and must die
        // with it.
        let pid: i32 = fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut alive = true;
        for _ in 0..50 {
            if !is_running(pid) {
                alive = false;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(!alive, "runner descendant {pid} survived shutdown");
    }

    #[test]
    fn test_start_point_prefers_matching_index() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::for_log(dir.path().join("run.log"));
        let tests: Vec<TestId> = ["a", "b", "b", "c"].iter().map(|i| TestId::from(*i)).collect();
        let cp = Checkpoint::after(&tests, 1, Mode::Csv, None, Path::new("/pt"));
        store.save(&cp).unwrap();

        let options = RunOptions {
            resume: true,
            ..options()
        };
        let ctx = RunContext::new(Mode::Csv, tests.clone());
        assert_eq!(start_point(&store, &options, &ctx).index, 2);

        // Sequence changed: fall back to lookup by name.
        let shifted = vec![TestId::from("x"), TestId::from("b"), TestId::from("c")];
        let ctx = RunContext::new(Mode::Csv, shifted);
        assert_eq!(start_point(&store, &options, &ctx).index, 1);

        // Different mode: start over.
        let ctx = RunContext::new(Mode::FullSuite, tests);
        let start = start_point(&store, &options, &ctx);
        assert_eq!(start.index, 0);
        assert!(!start.resumed);
    }
}
