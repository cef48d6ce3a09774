//! Authentication for GitHub and GitLab
//!
//! Supports CLI-based auth (gh, glab) and environment variables.

mod github;
mod gitlab;

pub use github::{GitHubAuthConfig, get_github_auth, test_github_auth};
pub use gitlab::{GitLabAuthConfig, get_gitlab_auth, test_gitlab_auth};

use std::env;
use tokio::process::Command;
use tracing::debug;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh or glab)
    Cli,
    /// Token from environment variable
    EnvVar,
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::EnvVar => write!(f, "environment variable"),
        }
    }
}

/// First non-empty value among `vars`
fn token_from_env(vars: &[&str]) -> Option<String> {
    vars.iter().find_map(|var| {
        env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Ask a CLI tool for its stored token (`<program> auth token [args]`)
async fn token_from_cli(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .arg("auth")
        .arg("token")
        .args(args)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        debug!(program, "CLI auth token lookup failed");
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(unsafe_code)]
pub(crate) mod tests {
    use super::*;
    use serial_test::serial;

    pub(crate) fn set_env(key: &str, value: &str) {
        // SAFETY: env tests are serialized with #[serial]
        unsafe { env::set_var(key, value) };
    }

    pub(crate) fn remove_env(key: &str) {
        // SAFETY: env tests are serialized with #[serial]
        unsafe { env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn test_token_from_env_order() {
        set_env("DEPBUMP_TEST_TOKEN_A", "");
        set_env("DEPBUMP_TEST_TOKEN_B", " second ");
        assert_eq!(
            token_from_env(&["DEPBUMP_TEST_TOKEN_A", "DEPBUMP_TEST_TOKEN_B"]),
            Some("second".to_string())
        );
        remove_env("DEPBUMP_TEST_TOKEN_A");
        remove_env("DEPBUMP_TEST_TOKEN_B");
        assert_eq!(token_from_env(&["DEPBUMP_TEST_TOKEN_A"]), None);
    }

    #[tokio::test]
    async fn test_missing_cli_yields_none() {
        assert_eq!(token_from_cli("depbump-no-such-binary", &[]).await, None);
    }
}
