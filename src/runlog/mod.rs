//! Human-readable run log
//!
//! The log is both the operator's view of a run and the persisted source for
//! rerun selection; writer and reader share [`format`].

pub mod format;
mod reader;
mod writer;

pub use reader::{read_log, RerunLogError};
pub use writer::LogWriter;
