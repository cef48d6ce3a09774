//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, combine_statuses};
use crate::types::{BranchStatus, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (CI status checking)
    token: String,
    /// HTTP client for raw requests (CI status checking)
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
}

#[derive(Deserialize)]
struct CombinedStatus {
    state: String,
    total_count: u32,
}

#[derive(Deserialize)]
struct CheckRunsResponse {
    total_count: u32,
    check_runs: Vec<CheckRun>,
}

#[derive(Deserialize)]
struct CheckRun {
    status: String,
    conclusion: Option<String>,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let api_base = host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, owner, repo, host, api_base)
    }

    /// Create a service talking to an explicit API base URL
    pub fn with_api_base(
        token: &str,
        owner: String,
        repo: String,
        host: Option<String>,
        api_base: String,
    ) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("depbump")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner,
                repo,
                host,
            },
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn commit_url(&self, ref_name: &str, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/commits/{}/{}",
            self.api_base,
            self.config.owner,
            self.config.repo,
            ref_name.replace('#', "%23"),
            suffix
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch {url}: {e}")))
    }

    /// Status from the legacy combined status API (external CI services)
    async fn commit_status(&self, ref_name: &str) -> Result<BranchStatus> {
        let response = self.get(&self.commit_url(ref_name, "status")).await?;

        if !response.status().is_success() {
            debug!(
                status = %response.status(),
                "Commit status check returned non-success, assuming no statuses configured"
            );
            return Ok(BranchStatus::Green);
        }

        let status: CombinedStatus = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse commit status: {e}")))?;

        if status.total_count == 0 {
            debug!("No commit statuses configured");
            return Ok(BranchStatus::Green);
        }

        debug!(state = %status.state, count = status.total_count, "Commit status result");
        Ok(match status.state.as_str() {
            "success" => BranchStatus::Green,
            "failure" | "error" => BranchStatus::Red,
            _ => BranchStatus::Yellow,
        })
    }

    /// Status from GitHub Actions check runs
    async fn check_runs_status(&self, ref_name: &str) -> Result<BranchStatus> {
        let response = self.get(&self.commit_url(ref_name, "check-runs")).await?;

        if !response.status().is_success() {
            debug!(
                status = %response.status(),
                "Check runs returned non-success, assuming no checks configured"
            );
            return Ok(BranchStatus::Green);
        }

        let check_runs: CheckRunsResponse = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse check runs: {e}")))?;

        if check_runs.total_count == 0 {
            debug!("No check runs configured");
            return Ok(BranchStatus::Green);
        }

        let status = combine_statuses(check_runs.check_runs.iter().map(check_run_status));
        debug!(count = check_runs.total_count, %status, "Check runs result");
        Ok(status)
    }
}

fn check_run_status(run: &CheckRun) -> BranchStatus {
    if run.status != "completed" {
        return BranchStatus::Yellow;
    }
    match run.conclusion.as_deref() {
        Some("success" | "neutral" | "skipped") => BranchStatus::Green,
        // Completed but no conclusion is treated as failure
        _ => BranchStatus::Red,
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_branch_pr(&self, branch: &str) -> Result<Option<PullRequest>> {
        debug!(branch, "finding branch PR");
        let head = format!("{}:{}", &self.config.owner, branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, "found branch PR");
        } else {
            debug!("no branch PR found");
        }
        Ok(result)
    }

    async fn get_branch_status(&self, branch: &str) -> Result<BranchStatus> {
        debug!(branch, "getting branch status");
        let statuses = self.commit_status(branch).await?;
        let check_runs = self.check_runs_status(branch).await?;
        let status = combine_statuses([statuses, check_runs]);
        debug!(branch, %status, "got branch status");
        Ok(status)
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut builder = pulls.create(title, head, base);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
