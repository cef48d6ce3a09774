//! Merge error classification - pure functions
//!
//! Git and platform merge failures only carry a message. This module turns
//! that message into a reason the caller can act on.

use crate::types::AutomergeResult;

/// Why a branch merge was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeErrorReason {
    /// The merge was explicitly reported as not ready
    NotReady,
    /// Branch is behind or unrelated to its base
    Stale,
    /// Branch protection still waits for status checks
    RequiredStatusChecks,
    /// Branch protection requires reviewers
    RequiredReviewers,
    /// Any other branch protection rule
    Protected,
    /// Unrecognized failure
    Unknown,
}

impl MergeErrorReason {
    /// Automerge outcome reported for this reason
    pub const fn result(self) -> AutomergeResult {
        match self {
            Self::NotReady | Self::RequiredStatusChecks => AutomergeResult::NotReady,
            Self::Stale => AutomergeResult::Stale,
            Self::RequiredReviewers | Self::Protected | Self::Unknown => AutomergeResult::Failed,
        }
    }
}

/// Messages git produces when the branch cannot fast-forward onto its base
const STALE_MARKERS: &[&str] = &[
    "refusing to merge unrelated histories",
    "Not possible to fast-forward",
    "Updates were rejected because the tip of your current branch is behind",
    "Updates were rejected because a pushed branch tip is behind",
];

/// Classify a merge failure message
///
/// Checks run in priority order: the exact `not ready` message, stale
/// markers, then branch protection variants.
pub fn classify_merge_error(message: &str) -> MergeErrorReason {
    if message == "not ready" {
        return MergeErrorReason::NotReady;
    }
    if STALE_MARKERS.iter().any(|m| message.contains(m)) {
        return MergeErrorReason::Stale;
    }
    if message.contains("Protected branch") {
        if message.contains("status check") {
            return MergeErrorReason::RequiredStatusChecks;
        }
        if message.contains("reviewers") {
            return MergeErrorReason::RequiredReviewers;
        }
        return MergeErrorReason::Protected;
    }
    MergeErrorReason::Unknown
}
