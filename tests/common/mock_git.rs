//! Mock git operations for testing

#![allow(dead_code)]

use async_trait::async_trait;
use depbump::error::{Error, Result};
use depbump::git::GitOps;
use depbump::types::GitRemote;
use std::sync::Mutex;

/// Hand-written `GitOps` mock that records merges
pub struct MockGit {
    remotes: Vec<GitRemote>,
    default_branch: String,
    merge_calls: Mutex<Vec<String>>,
    error_on_merge: Mutex<Option<String>>,
}

impl MockGit {
    /// Mock with a single GitHub `origin` and `main` as default branch
    pub fn new() -> Self {
        Self {
            remotes: vec![GitRemote {
                name: "origin".to_string(),
                url: "git@github.com:acme/widgets.git".to_string(),
            }],
            default_branch: "main".to_string(),
            merge_calls: Mutex::new(Vec::new()),
            error_on_merge: Mutex::new(None),
        }
    }

    /// Make `merge_branch` fail with git's `message`
    pub fn fail_merge(&self, message: &str) {
        *self.error_on_merge.lock().unwrap() = Some(message.to_string());
    }

    pub fn merge_calls(&self) -> Vec<String> {
        self.merge_calls.lock().unwrap().clone()
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitOps for MockGit {
    async fn merge_branch(&self, branch: &str) -> Result<()> {
        self.merge_calls.lock().unwrap().push(branch.to_string());
        match self.error_on_merge.lock().unwrap().as_ref() {
            Some(message) => Err(Error::Git(message.clone())),
            None => Ok(()),
        }
    }

    async fn remotes(&self) -> Result<Vec<GitRemote>> {
        Ok(self.remotes.clone())
    }

    async fn default_branch(&self) -> Result<String> {
        Ok(self.default_branch.clone())
    }
}
