//! GitLab token lookup

use super::{AuthSource, token_from_cli, token_from_env};
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// Environment variables checked for a GitLab token, in order
const TOKEN_VARS: &[&str] = &["GITLAB_TOKEN", "GL_TOKEN"];

/// Resolved GitLab credentials
#[derive(Debug, Clone)]
pub struct GitLabAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// GitLab host (`gitlab.com` unless self-hosted)
    pub host: String,
}

#[derive(Deserialize)]
struct GitLabUser {
    username: String,
}

/// Find a GitLab token: environment first, then `glab auth token`
pub async fn get_gitlab_auth(host: Option<&str>) -> Result<GitLabAuthConfig> {
    let host = host.unwrap_or("gitlab.com").to_string();

    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("using GitLab token from environment");
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host,
        });
    }

    if let Some(token) = token_from_cli("glab", &["--hostname", host.as_str()]).await {
        debug!("using GitLab token from glab CLI");
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::Cli,
            host,
        });
    }

    Err(Error::Auth(
        "no GitLab token found; set GITLAB_TOKEN or run `glab auth login`".to_string(),
    ))
}

/// Verify the token and return the authenticated username
pub async fn test_gitlab_auth(config: &GitLabAuthConfig) -> Result<String> {
    let url = format!("https://{}/api/v4/user", config.host);
    let user: GitLabUser = reqwest::Client::new()
        .get(&url)
        .header("PRIVATE-TOKEN", &config.token)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| Error::GitLabApi(e.to_string()))?
        .json()
        .await?;
    Ok(user.username)
}
