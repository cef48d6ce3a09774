//! Automerge execution - effectful operations
//!
//! Queries the platform for an existing PR and the branch status, then
//! merges through git. Merge failures are classified, not propagated.

use crate::automerge::classify::{MergeErrorReason, classify_merge_error};
use crate::config::{AutomergeType, BranchConfig};
use crate::error::Result;
use crate::git::GitOps;
use crate::platform::PlatformService;
use crate::types::{AutomergeResult, BranchStatus};
use tracing::{debug, info, warn};

/// Branch status, short-circuited to green when tests are ignored
pub async fn resolve_branch_status(
    platform: &dyn PlatformService,
    branch: &str,
    ignore_tests: bool,
) -> Result<BranchStatus> {
    if ignore_tests {
        debug!(branch, "ignoring tests, treating branch as green");
        return Ok(BranchStatus::Green);
    }
    platform.get_branch_status(branch).await
}

/// Try to merge an update branch straight into its base (EFFECTFUL)
///
/// Platform errors while looking up the PR or the status are returned as
/// `Err`. Merge failures become one of the automerge outcomes.
pub async fn try_branch_automerge(
    config: &BranchConfig,
    platform: &dyn PlatformService,
    git: &dyn GitOps,
) -> Result<AutomergeResult> {
    let branch = config.branch_name.as_str();
    debug!(branch, "checking if branch can be automerged");

    if !(config.automerge && config.automerge_type == AutomergeType::Branch) {
        return Ok(AutomergeResult::NoAutomerge);
    }

    if platform.get_branch_pr(branch).await?.is_some() {
        return Ok(AutomergeResult::AbortedPrExists);
    }

    let status = resolve_branch_status(platform, branch, config.ignore_tests).await?;
    match status {
        BranchStatus::Green => Ok(merge(config, git).await),
        BranchStatus::Red => Ok(AutomergeResult::BranchStatusError),
        BranchStatus::Yellow => {
            debug!(branch, %status, "branch status not green, skipping automerge");
            Ok(AutomergeResult::NoAutomerge)
        }
    }
}

async fn merge(config: &BranchConfig, git: &dyn GitOps) -> AutomergeResult {
    let branch = config.branch_name.as_str();
    debug!(branch, "automerging branch");

    let outcome = if config.dry_run {
        info!("DRY-RUN: Would automerge branch {branch}");
        Ok(())
    } else {
        git.merge_branch(branch).await
    };

    let err = match outcome {
        Ok(()) => {
            info!(branch, "branch automerged");
            return AutomergeResult::Automerged;
        }
        Err(e) => e.to_string(),
    };

    let reason = classify_merge_error(&err);
    match reason {
        MergeErrorReason::NotReady => debug!(branch, "branch is not ready for automerge"),
        MergeErrorReason::Stale => {
            debug!(branch, err = %err, "branch automerge error");
            info!(branch, "branch is not up to date, cannot automerge");
        }
        MergeErrorReason::RequiredStatusChecks => debug!(
            branch,
            err = %err,
            "branch is not ready for automerge: required status checks are remaining"
        ),
        MergeErrorReason::RequiredReviewers => info!(
            branch,
            err = %err,
            "branch automerge is not possible due to branch protection (required reviewers)"
        ),
        MergeErrorReason::Protected => info!(
            branch,
            err = %err,
            "branch automerge is not possible due to branch protection"
        ),
        MergeErrorReason::Unknown => {
            warn!(branch, err = %err, "unknown error when attempting branch automerge");
        }
    }
    reason.result()
}

/// Whether an outcome should fall back to opening a PR for review
pub const fn branch_outcome_needs_pr(result: AutomergeResult) -> bool {
    matches!(
        result,
        AutomergeResult::BranchStatusError | AutomergeResult::Failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_needing_pr() {
        assert!(branch_outcome_needs_pr(AutomergeResult::BranchStatusError));
        assert!(branch_outcome_needs_pr(AutomergeResult::Failed));
        for result in [
            AutomergeResult::Automerged,
            AutomergeResult::AbortedPrExists,
            AutomergeResult::NoAutomerge,
            AutomergeResult::Stale,
            AutomergeResult::NotReady,
        ] {
            assert!(!branch_outcome_needs_pr(result));
        }
    }
}
