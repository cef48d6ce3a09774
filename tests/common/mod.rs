//! Shared test utilities

#![allow(dead_code)]

mod mock_git;
mod mock_platform;

pub use mock_git::MockGit;
pub use mock_platform::{CreatePrCall, MockPlatformService};

use depbump::config::{AutomergeType, BranchConfig};
use depbump::types::{Platform, PlatformConfig, PullRequest};
use std::fs;
use std::path::Path;

/// GitHub config for `acme/widgets`
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitHub,
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        host: None,
    }
}

/// Open PR from `head` into main
pub fn make_pr(number: u64, head: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/acme/widgets/pull/{number}"),
        base_ref: "main".to_string(),
        head_ref: head.to_string(),
        title: format!("Update {head}"),
    }
}

/// Branch automerge enabled for `branch`
pub fn branch_config(branch: &str) -> BranchConfig {
    BranchConfig {
        branch_name: branch.to_string(),
        automerge: true,
        automerge_type: AutomergeType::Branch,
        ignore_tests: false,
        dry_run: false,
    }
}

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Throwaway clone of a bare repository, for exercising real git merges
pub struct TempGitRepo {
    dir: std::sync::Arc<tempfile::TempDir>,
    /// Bare repository the clone pushes to
    pub bare: std::path::PathBuf,
    /// Working clone
    pub work: std::path::PathBuf,
    /// Name of the bare repository's remote in `work`
    pub remote: String,
}

impl TempGitRepo {
    /// Bare `origin` plus a clone with one commit pushed to `main`
    pub fn new() -> Self {
        Self::with_remote_name("origin")
    }

    /// Like `new`, with the bare repository cloned under `remote`
    pub fn with_remote_name(remote: &str) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let bare = dir.path().join("origin.git");
        let work = dir.path().join("work");

        git(dir.path(), &["init", "--bare", bare.to_str().unwrap()]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(
            dir.path(),
            &["clone", "-o", remote, bare.to_str().unwrap(), work.to_str().unwrap()],
        );
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        let repo = Self {
            dir: std::sync::Arc::new(dir),
            bare,
            work,
            remote: remote.to_string(),
        };
        repo.commit("README.md", "hello\n");
        git(&repo.work, &["push", &repo.remote, "main"]);
        repo
    }

    /// Another clone of the same bare repository, checked out on `main`
    pub fn second_clone(&self) -> Self {
        let work = self.dir.path().join("second");
        git(
            self.dir.path(),
            &[
                "clone",
                "-o",
                &self.remote,
                self.bare.to_str().unwrap(),
                work.to_str().unwrap(),
            ],
        );
        Self {
            dir: self.dir.clone(),
            bare: self.bare.clone(),
            work,
            remote: self.remote.clone(),
        }
    }

    /// Write a file and commit it on the current branch
    pub fn commit(&self, file: &str, content: &str) {
        write_file(&self.work, file, content);
        git(&self.work, &["add", file]);
        git(
            &self.work,
            &[
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-m",
                &format!("update {file}"),
            ],
        );
    }

    /// Create `branch` from the current HEAD with one commit, push it and
    /// return to main
    pub fn push_branch(&self, branch: &str, file: &str) {
        git(&self.work, &["checkout", "-b", branch]);
        self.commit(file, branch);
        git(&self.work, &["push", &self.remote, branch]);
        git(&self.work, &["checkout", "main"]);
    }

    /// Commit id `reference` points at in the working clone
    pub fn rev_parse(&self, reference: &str) -> String {
        git(&self.work, &["rev-parse", reference])
    }

    /// Commit id `branch` points at in the bare repository
    pub fn remote_head(&self, branch: &str) -> String {
        git(&self.bare, &["rev-parse", &format!("refs/heads/{branch}")])
    }
}

/// Run git in `dir`, panicking on failure, and return trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
