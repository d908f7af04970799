//! Test outcome models
//!
//! Defines per-test outcomes, the append-only run record and the summary
//! derived from it.

use std::fmt;
use std::time::Duration;

use super::TestId;

/// Final state of one executed test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Passed,
    Skipped,
    Error,
    Failed,
    TimedOut,
}

impl Outcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Passed | Outcome::Skipped => "✓",
            Outcome::Error | Outcome::Failed | Outcome::TimedOut => "✗",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Skipped => "SKIPPED",
            Outcome::Error => "ERROR",
            Outcome::Failed => "FAILED",
            Outcome::TimedOut => "TIMEDOUT",
        }
    }

    /// ERROR, FAILED and TIMEDOUT fail the run; SKIPPED does not
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Error | Outcome::Failed | Outcome::TimedOut)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.label())
    }
}

/// One executed test
#[derive(Clone, Debug, PartialEq)]
pub struct TestRecord {
    pub id: TestId,
    pub outcome: Outcome,
    pub duration: Duration,
}

impl TestRecord {
    pub fn new(id: TestId, outcome: Outcome, duration: Duration) -> Self {
        Self {
            id,
            outcome,
            duration,
        }
    }
}

impl fmt::Display for TestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{:.2}s]",
            self.outcome,
            self.id,
            self.duration.as_secs_f64()
        )
    }
}

/// Tests executed by a run, in execution order
#[derive(Clone, Debug, Default)]
pub struct RunRecord {
    records: Vec<TestRecord>,
}

impl RunRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TestRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn summary(&self, elapsed: Duration) -> Summary {
        Summary::new(self.records(), elapsed)
    }
}

/// Counts and failure lists derived from a run record
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub elapsed: Duration,
    /// FAILED and ERROR tests in execution order
    pub failed_tests: Vec<TestRecord>,
    pub timed_out_tests: Vec<TestRecord>,
}

impl Summary {
    pub fn new(records: &[TestRecord], elapsed: Duration) -> Self {
        let count = |outcome: Outcome| records.iter().filter(|r| r.outcome == outcome).count();

        let failed_tests = records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed | Outcome::Error))
            .cloned()
            .collect();
        let timed_out_tests = records
            .iter()
            .filter(|r| r.outcome == Outcome::TimedOut)
            .cloned()
            .collect();

        Self {
            total: records.len(),
            passed: count(Outcome::Passed),
            skipped: count(Outcome::Skipped),
            errors: count(Outcome::Error),
            failed: count(Outcome::Failed),
            timed_out: count(Outcome::TimedOut),
            elapsed,
            failed_tests,
            timed_out_tests,
        }
    }

    pub fn failures(&self) -> usize {
        self.errors + self.failed + self.timed_out
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Process exit code for a run that reached execution
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
