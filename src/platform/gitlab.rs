//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, combine_statuses};
use crate::types::{BranchStatus, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    api_base: String,
    config: PlatformConfig,
    project_path: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
}

#[derive(Deserialize)]
struct Branch {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    id: String,
}

/// Commit status on a ref
#[derive(Deserialize)]
struct CommitStatus {
    status: String, // "success", "failed", "running", "pending", ...
    #[serde(default)]
    allow_failure: bool,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            number: mr.iid,
            html_url: mr.web_url,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            title: mr.title,
        }
    }
}

#[derive(Serialize)]
struct CreateMrPayload {
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    remove_source_branch: bool,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn commit_status(status: &CommitStatus) -> BranchStatus {
    match status.status.as_str() {
        "success" | "skipped" => BranchStatus::Green,
        "failed" | "canceled" if status.allow_failure => BranchStatus::Green,
        "failed" | "canceled" => BranchStatus::Red,
        _ => BranchStatus::Yellow,
    }
}

impl GitLabService {
    /// Create a new GitLab service
    pub fn new(token: String, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let host = host.unwrap_or_else(|| "gitlab.com".to_string());
        let api_base = format!("https://{host}/api/v4");
        let config_host = if host == "gitlab.com" { None } else { Some(host) };
        Self::with_api_base(token, owner, repo, config_host, api_base)
    }

    /// Create a service talking to an explicit API base URL
    pub fn with_api_base(
        token: String,
        owner: String,
        repo: String,
        host: Option<String>,
        api_base: String,
    ) -> Result<Self> {
        let project_path = format!("{owner}/{repo}");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            config: PlatformConfig {
                platform: Platform::GitLab,
                owner,
                repo,
                host,
            },
            project_path,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn encoded_project(&self) -> String {
        urlencoding::encode(&self.project_path).into_owned()
    }

    async fn branch_sha(&self, branch: &str) -> Result<String> {
        let url = self.api_url(&format!(
            "/projects/{}/repository/branches/{}",
            self.encoded_project(),
            urlencoding::encode(branch)
        ));

        let branch: Branch = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        Ok(branch.commit.id)
    }
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn get_branch_pr(&self, branch: &str) -> Result<Option<PullRequest>> {
        debug!(branch, "finding branch MR");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests",
            self.encoded_project()
        ));

        let mrs: Vec<MergeRequest> = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("source_branch", branch), ("state", "opened")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let result: Option<PullRequest> = mrs.into_iter().next().map(Into::into);
        if let Some(ref pr) = result {
            debug!(mr_iid = pr.number, "found branch MR");
        } else {
            debug!("no branch MR found");
        }
        Ok(result)
    }

    async fn get_branch_status(&self, branch: &str) -> Result<BranchStatus> {
        debug!(branch, "getting branch status");
        let sha = self.branch_sha(branch).await?;
        let url = self.api_url(&format!(
            "/projects/{}/repository/commits/{}/statuses",
            self.encoded_project(),
            sha
        ));

        let statuses: Vec<CommitStatus> = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let status = combine_statuses(statuses.iter().map(commit_status));
        debug!(branch, count = statuses.len(), %status, "got branch status");
        Ok(status)
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating MR");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests",
            self.encoded_project()
        ));

        let payload = CreateMrPayload {
            source_branch: head.to_string(),
            target_branch: base.to_string(),
            title: title.to_string(),
            description: body.map(ToString::to_string),
            remove_source_branch: true,
        };

        let mr: MergeRequest = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let pr: PullRequest = mr.into();
        debug!(mr_iid = pr.number, "created MR");
        Ok(pr)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(s: &str, allow_failure: bool) -> CommitStatus {
        CommitStatus {
            status: s.to_string(),
            allow_failure,
        }
    }

    #[test]
    fn test_commit_status_mapping() {
        assert_eq!(commit_status(&status("success", false)), BranchStatus::Green);
        assert_eq!(commit_status(&status("skipped", false)), BranchStatus::Green);
        assert_eq!(commit_status(&status("failed", false)), BranchStatus::Red);
        assert_eq!(commit_status(&status("canceled", false)), BranchStatus::Red);
        assert_eq!(commit_status(&status("running", false)), BranchStatus::Yellow);
        assert_eq!(commit_status(&status("pending", false)), BranchStatus::Yellow);
    }

    #[test]
    fn test_allowed_failure_does_not_block() {
        assert_eq!(commit_status(&status("failed", true)), BranchStatus::Green);
    }

    #[test]
    fn test_new_hides_default_host() {
        let svc = GitLabService::new(
            "t".to_string(),
            "group".to_string(),
            "proj".to_string(),
            None,
        )
        .unwrap();
        assert!(svc.config().host.is_none());
        assert_eq!(svc.api_url("/x"), "https://gitlab.com/api/v4/x");
    }
}
