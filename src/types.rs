//! Core types for depbump

use serde::{Deserialize, Serialize};

/// A single published version of a package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    /// Version string as published by the registry
    pub version: String,
}

/// Releases found for one package lookup
///
/// `releases` may be empty; lookups that find nothing usually return `None`
/// instead of an empty result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseResult {
    /// Releases in registry order
    pub releases: Vec<Release>,
}

impl ReleaseResult {
    /// Iterate over the release versions
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.releases.iter().map(|r| r.version.as_str())
    }
}

/// A dependency found in a manifest file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageDependency {
    /// Human-facing dependency name
    pub dep_name: String,
    /// Version currently pinned in the manifest
    pub current_value: Option<String>,
    /// Datasource id used to look up releases
    pub datasource: String,
    /// Name passed to the datasource (defaults to `dep_name`)
    pub lookup_name: Option<String>,
    /// Pinned digest, if any (e.g. `sha256:...`)
    pub current_digest: Option<String>,
    /// Why this dependency is not looked up
    pub skip_reason: Option<String>,
}

impl PackageDependency {
    /// Name to send to the datasource
    pub fn lookup_name(&self) -> &str {
        self.lookup_name.as_deref().unwrap_or(&self.dep_name)
    }
}

/// Dependencies extracted from one manifest file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageFile {
    /// Manager that extracted the file
    pub manager: String,
    /// Path relative to the repository root
    pub file_path: String,
    /// Extracted dependencies, in file order
    pub deps: Vec<PackageDependency>,
}

/// A dependency with a newer release available
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCandidate {
    /// Dependency name
    pub dep_name: String,
    /// Datasource the release came from
    pub datasource: String,
    /// Manifest the dependency lives in
    pub file_path: String,
    /// Currently pinned version
    pub current_value: String,
    /// Proposed version
    pub new_value: String,
}

impl UpdateCandidate {
    /// Conventional branch name for this update
    pub fn branch_name(&self, prefix: &str) -> String {
        let sanitized: String = self
            .dep_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '-' })
            .collect();
        format!("{prefix}{sanitized}-{}", self.new_value)
    }
}

/// Combined CI status of a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
    /// All checks passed (or none configured)
    Green,
    /// Checks pending or running
    Yellow,
    /// At least one check failed
    Red,
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Yellow => write!(f, "yellow"),
            Self::Red => write!(f, "red"),
        }
    }
}

// =============================================================================
// Automerge types
// =============================================================================

/// Outcome of a branch automerge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutomergeResult {
    /// Branch merged (or would have been, in dry-run)
    #[serde(rename = "automerged")]
    Automerged,
    /// A PR is open for the branch; merging is left to the PR
    #[serde(rename = "automerge aborted - PR exists")]
    AbortedPrExists,
    /// CI failed on the branch
    #[serde(rename = "branch status error")]
    BranchStatusError,
    /// Merge attempted and rejected
    #[serde(rename = "failed")]
    Failed,
    /// Automerge not configured, or CI still pending
    #[serde(rename = "no automerge")]
    NoAutomerge,
    /// Branch is behind its base and must be rebased first
    #[serde(rename = "stale")]
    Stale,
    /// Required checks have not completed yet
    #[serde(rename = "not ready")]
    NotReady,
}

impl AutomergeResult {
    /// Label used in logs and CLI output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automerged => "automerged",
            Self::AbortedPrExists => "automerge aborted - PR exists",
            Self::BranchStatusError => "branch status error",
            Self::Failed => "failed",
            Self::NoAutomerge => "no automerge",
            Self::Stale => "stale",
            Self::NotReady => "not ready",
        }
    }
}

impl std::fmt::Display for AutomergeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pull request / merge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user, organization, or GitLab group path)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}
