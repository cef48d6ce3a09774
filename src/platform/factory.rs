//! Platform service construction

use crate::auth::{get_github_auth, get_gitlab_auth};
use crate::error::Result;
use crate::platform::{GitHubService, GitLabService, PlatformService};
use crate::types::{Platform, PlatformConfig};
use tracing::debug;

/// Authenticate and build the service for `config.platform`
pub async fn create_platform_service(config: &PlatformConfig) -> Result<Box<dyn PlatformService>> {
    let host = config.host.as_deref();
    debug!(platform = %config.platform, owner = %config.owner, repo = %config.repo, "creating platform service");

    match config.platform {
        Platform::GitHub => {
            let auth = get_github_auth(host).await?;
            debug!(source = %auth.source, "GitHub auth resolved");
            Ok(Box::new(GitHubService::new(
                &auth.token,
                config.owner.clone(),
                config.repo.clone(),
                config.host.clone(),
            )?))
        }
        Platform::GitLab => {
            let auth = get_gitlab_auth(host).await?;
            debug!(source = %auth.source, "GitLab auth resolved");
            Ok(Box::new(GitLabService::new(
                auth.token,
                config.owner.clone(),
                config.repo.clone(),
                config.host.clone(),
            )?))
        }
    }
}
