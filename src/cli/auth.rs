//! Auth command - check platform credentials

use crate::cli::style::{Stylize, check};
use anstream::println;
use depbump::auth::{get_github_auth, get_gitlab_auth, test_github_auth, test_gitlab_auth};
use depbump::error::Result;
use std::env;

/// Platform to check credentials for
#[derive(Debug, Clone, Copy)]
pub enum AuthTarget {
    /// GitHub (host from `GH_HOST`)
    GitHub,
    /// GitLab (host from `GITLAB_HOST`)
    GitLab,
}

/// Show the token source, and verify it against the API when `test` is set
pub async fn run_auth(target: AuthTarget, test: bool) -> Result<()> {
    match target {
        AuthTarget::GitHub => {
            let host = env::var("GH_HOST").ok();
            let config = get_github_auth(host.as_deref()).await?;
            println!("GitHub token found via {}", config.source.accent());
            if test {
                let login = test_github_auth(&config).await?;
                println!("{} Authenticated as {}", check(), login.emphasis());
            }
        }
        AuthTarget::GitLab => {
            let host = env::var("GITLAB_HOST").ok();
            let config = get_gitlab_auth(host.as_deref()).await?;
            println!(
                "GitLab token for {} found via {}",
                config.host.muted(),
                config.source.accent()
            );
            if test {
                let username = test_gitlab_auth(&config).await?;
                println!("{} Authenticated as {}", check(), username.emphasis());
            }
        }
    }
    Ok(())
}
