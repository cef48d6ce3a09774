//! Local git operations
//!
//! Merges go through the `git` binary so that its own error text reaches the
//! automerge classifier unchanged. A merge never touches the working tree: the
//! remote base branch is fast-forwarded by pushing the fetched update branch.

use crate::error::{Error, Result};
use crate::types::GitRemote;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Git operations needed by automerge
#[async_trait]
pub trait GitOps: Send + Sync {
    /// Fast-forward the remote base branch to the remote `branch`
    async fn merge_branch(&self, branch: &str) -> Result<()>;

    /// Configured remotes
    async fn remotes(&self) -> Result<Vec<GitRemote>>;

    /// Default branch of the remote
    async fn default_branch(&self) -> Result<String>;
}

/// `GitOps` backed by the `git` CLI
pub struct CliGit {
    repo_dir: PathBuf,
    remote: String,
    base_branch: Option<String>,
}

impl CliGit {
    /// Operate on the repository at `repo_dir`, merging on `remote`
    ///
    /// `base_branch` overrides the remote's default branch as merge target.
    pub fn new(
        repo_dir: impl Into<PathBuf>,
        remote: impl Into<String>,
        base_branch: Option<String>,
    ) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
            base_branch,
        }
    }

    /// Same repository, merging on `remote` instead
    pub fn with_remote(self, remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            ..self
        }
    }

    /// Repository directory
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Remote merges are pushed to
    pub fn remote(&self) -> &str {
        &self.remote
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(args = %args.join(" "), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if stdout.is_empty() {
                format!("git {} failed", args.join(" "))
            } else {
                stdout
            }
        } else {
            stderr
        };
        Err(Error::Git(message))
    }

    /// Run git and report whether it exited successfully
    async fn succeeds(&self, args: &[&str]) -> Result<bool> {
        debug!(args = %args.join(" "), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;
        Ok(output.status.success())
    }

    fn tracking_ref(&self, branch: &str) -> String {
        format!("refs/remotes/{}/{branch}", self.remote)
    }

    async fn base_branch(&self) -> Result<String> {
        match &self.base_branch {
            Some(base) => Ok(base.clone()),
            None => self.default_branch().await,
        }
    }
}

/// Parse `git remote -v` output, keeping fetch URLs
fn parse_remotes(output: &str) -> Vec<GitRemote> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            (parts.next() == Some("(fetch)")).then(|| GitRemote {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl GitOps for CliGit {
    async fn merge_branch(&self, branch: &str) -> Result<()> {
        let base = self.base_branch().await?;
        let remote = self.remote.as_str();
        let branch_ref = self.tracking_ref(branch);
        let base_ref = self.tracking_ref(&base);
        debug!(branch, base = %base, remote, "merging branch");

        self.run(&[
            "fetch",
            remote,
            &format!("+refs/heads/{branch}:{branch_ref}"),
            &format!("+refs/heads/{base}:{base_ref}"),
        ])
        .await?;

        if !self
            .succeeds(&["merge-base", "--is-ancestor", &base_ref, &branch_ref])
            .await?
        {
            return Err(Error::Git(format!(
                "Not possible to fast-forward {base} to {branch}"
            )));
        }

        // The remote rejects anything but a fast-forward of base.
        self.run(&["push", remote, &format!("{branch_ref}:refs/heads/{base}")])
            .await?;

        debug!(branch, base = %base, remote, "branch merged");
        Ok(())
    }

    async fn remotes(&self) -> Result<Vec<GitRemote>> {
        let output = self.run(&["remote", "-v"]).await?;
        Ok(parse_remotes(&output))
    }

    async fn default_branch(&self) -> Result<String> {
        let remote = self.remote.as_str();
        let mut candidates = Vec::new();
        if let Ok(head) = self
            .run(&["symbolic-ref", "--short", &self.tracking_ref("HEAD")])
            .await
            && let Some(branch) = head.strip_prefix(&format!("{remote}/"))
        {
            candidates.push(branch.to_string());
        }
        candidates.extend(["main".to_string(), "master".to_string()]);

        for candidate in candidates {
            let reference = self.tracking_ref(&candidate);
            if self
                .run(&["rev-parse", "--verify", "--quiet", &reference])
                .await
                .is_ok()
            {
                return Ok(candidate);
            }
        }

        Err(Error::Git(format!(
            "cannot determine default branch of {remote}; set base_branch"
        )))
    }
}
