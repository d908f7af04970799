//! Data models for test orchestration
//!
//! This module contains all data structures used throughout the application.

mod mode;
mod test_result;

pub use mode::{Mode, TestId};
pub use test_result::{Outcome, RunRecord, Summary, TestRecord};
