//! GitHub token lookup

use super::{AuthSource, token_from_cli, token_from_env};
use crate::error::{Error, Result};
use octocrab::Octocrab;
use tracing::debug;

/// Environment variables checked for a GitHub token, in order
const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// GitHub Enterprise host, if any
    pub host: Option<String>,
}

/// Find a GitHub token: environment first, then `gh auth token`
pub async fn get_github_auth(host: Option<&str>) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host.map(ToString::to_string),
        });
    }

    let args: Vec<&str> = host.map_or_else(Vec::new, |h| vec!["--hostname", h]);
    if let Some(token) = token_from_cli("gh", &args).await {
        debug!("using GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            host: host.map(ToString::to_string),
        });
    }

    Err(Error::Auth(
        "no GitHub token found; set GITHUB_TOKEN or run `gh auth login`".to_string(),
    ))
}

/// Verify the token and return the authenticated login
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    let mut builder = Octocrab::builder().personal_token(config.token.clone());
    if let Some(host) = &config.host {
        builder = builder
            .base_uri(format!("https://{host}/api/v3"))
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
    }
    let client = builder
        .build()
        .map_err(|e| Error::GitHubApi(e.to_string()))?;

    let user = client.current().user().await?;
    Ok(user.login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::{remove_env, set_env};
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_github_token_prefers_env() {
        set_env("GITHUB_TOKEN", "ghp_from_env");
        let config = get_github_auth(Some("github.example.com")).await.unwrap();
        remove_env("GITHUB_TOKEN");

        assert_eq!(config.token, "ghp_from_env");
        assert_eq!(config.source, AuthSource::EnvVar);
        assert_eq!(config.host.as_deref(), Some("github.example.com"));
    }

    #[tokio::test]
    #[serial]
    async fn test_gh_token_fallback_var() {
        remove_env("GITHUB_TOKEN");
        set_env("GH_TOKEN", "ghp_second");
        let config = get_github_auth(None).await.unwrap();
        remove_env("GH_TOKEN");

        assert_eq!(config.token, "ghp_second");
    }
}
