//! Test execution engine
//!
//! Supervises one runner process per test, strictly sequentially.

mod driver;
mod harness;
mod process;
mod signal;

pub use driver::{Driver, RunOptions, RunPlan};
pub use harness::{PythonHarness, TestHarness};
pub use process::run_with_timeout;
pub use signal::Signals;
