//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use depbump::error::{Error, Result};
use depbump::platform::PlatformService;
use depbump::types::{BranchStatus, PlatformConfig, PullRequest};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
}

/// Hand-written mock platform service
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Configurable PR and status responses per branch
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    branch_prs: Mutex<HashMap<String, PullRequest>>,
    branch_statuses: Mutex<HashMap<String, BranchStatus>>,
    // Call tracking
    get_branch_pr_calls: Mutex<Vec<String>>,
    get_branch_status_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_get_branch_pr: Mutex<Option<String>>,
    error_on_get_branch_status: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(1),
            branch_prs: Mutex::new(HashMap::new()),
            branch_statuses: Mutex::new(HashMap::new()),
            get_branch_pr_calls: Mutex::new(Vec::new()),
            get_branch_status_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_get_branch_pr: Mutex::new(None),
            error_on_get_branch_status: Mutex::new(None),
        }
    }

    /// Report an open PR for `branch`
    pub fn set_branch_pr(&self, branch: &str, pr: PullRequest) {
        self.branch_prs
            .lock()
            .unwrap()
            .insert(branch.to_string(), pr);
    }

    /// Report `status` for `branch` (unset branches are green)
    pub fn set_branch_status(&self, branch: &str, status: BranchStatus) {
        self.branch_statuses
            .lock()
            .unwrap()
            .insert(branch.to_string(), status);
    }

    /// Make `get_branch_pr` return an error
    pub fn fail_get_branch_pr(&self, msg: &str) {
        *self.error_on_get_branch_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_branch_status` return an error
    pub fn fail_get_branch_status(&self, msg: &str) {
        *self.error_on_get_branch_status.lock().unwrap() = Some(msg.to_string());
    }

    pub fn get_branch_pr_calls(&self) -> Vec<String> {
        self.get_branch_pr_calls.lock().unwrap().clone()
    }

    pub fn get_branch_status_calls(&self) -> Vec<String> {
        self.get_branch_status_calls.lock().unwrap().clone()
    }

    pub fn create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// No platform call was made at all
    pub fn assert_untouched(&self) {
        assert!(self.get_branch_pr_calls().is_empty(), "unexpected get_branch_pr");
        assert!(
            self.get_branch_status_calls().is_empty(),
            "unexpected get_branch_status"
        );
        assert!(self.create_pr_calls().is_empty(), "unexpected create_pr");
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_branch_pr(&self, branch: &str) -> Result<Option<PullRequest>> {
        self.get_branch_pr_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_get_branch_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self.branch_prs.lock().unwrap().get(branch).cloned())
    }

    async fn get_branch_status(&self, branch: &str) -> Result<BranchStatus> {
        self.get_branch_status_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_get_branch_status.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .branch_statuses
            .lock()
            .unwrap()
            .get(branch)
            .copied()
            .unwrap_or(BranchStatus::Green))
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
        });

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!(
                "https://github.com/{}/{}/pull/{number}",
                self.config.owner, self.config.repo
            ),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
        })
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
