//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface for the branch/PR queries automerge needs.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{detect_platform, parse_repo_info, select_remote};
pub use factory::create_platform_service;
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{BranchStatus, PlatformConfig, PullRequest};
use async_trait::async_trait;

/// Platform service trait for branch and PR operations
///
/// This trait abstracts GitHub and GitLab operations, allowing the same
/// automerge logic to work with either platform.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find the open PR whose head is `branch`
    async fn get_branch_pr(&self, branch: &str) -> Result<Option<PullRequest>>;

    /// Combined CI status of the branch head
    async fn get_branch_status(&self, branch: &str) -> Result<BranchStatus>;

    /// Open a PR from `head` into `base`
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

/// Fold individual check states into one branch status.
///
/// Any failure wins over pending, and pending wins over success. No checks
/// at all counts as green.
pub fn combine_statuses<I: IntoIterator<Item = BranchStatus>>(statuses: I) -> BranchStatus {
    let mut combined = BranchStatus::Green;
    for status in statuses {
        match status {
            BranchStatus::Red => return BranchStatus::Red,
            BranchStatus::Yellow => combined = BranchStatus::Yellow,
            BranchStatus::Green => {}
        }
    }
    combined
}
