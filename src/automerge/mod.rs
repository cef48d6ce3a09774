//! Branch automerge
//!
//! Two phases:
//! 1. Classify - map a failed merge's message to a reason (pure, testable)
//! 2. Execute - query the platform, merge through git, report the outcome

mod classify;
mod execute;

pub use classify::{MergeErrorReason, classify_merge_error};
pub use execute::{branch_outcome_needs_pr, resolve_branch_status, try_branch_automerge};
