//! Platform detection from git remote URLs

use crate::error::{Error, Result};
use crate::types::{GitRemote, Platform, PlatformConfig};
use regex::Regex;
use std::env;
use std::sync::LazyLock;
use url::Url;

/// scp-style SSH remote: `git@host:owner/repo.git`
static SCP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/]+@)?(?P<host>[^:/]+):(?P<path>[^/].*)$").expect("valid regex")
});

/// Detect the platform a remote URL points at
pub fn detect_platform(url: &str) -> Option<Platform> {
    let (host, _) = split_remote(url)?;
    platform_for_host(&host)
}

/// Parse owner, repo and host out of a remote URL
///
/// GitLab nested groups are kept whole in `owner` (`group/subgroup`).
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let (host, path) = split_remote(url).ok_or(Error::NoSupportedRemotes)?;
    let platform = platform_for_host(&host).ok_or(Error::NoSupportedRemotes)?;

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path
        .rsplit_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
        .ok_or_else(|| Error::Platform(format!("cannot parse repository from {url}")))?;

    if platform == Platform::GitHub && owner.contains('/') {
        return Err(Error::Platform(format!(
            "cannot parse repository from {url}"
        )));
    }

    let host = match (platform, host.as_str()) {
        (Platform::GitHub, "github.com") | (Platform::GitLab, "gitlab.com") => None,
        _ => Some(host),
    };

    Ok(PlatformConfig {
        platform,
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}

/// Choose the remote to talk to
///
/// An explicit name must exist. Otherwise `origin` is preferred, then the
/// first remote on a supported platform.
pub fn select_remote(remotes: &[GitRemote], name: Option<&str>) -> Result<GitRemote> {
    if let Some(name) = name {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    let supported: Vec<&GitRemote> = remotes
        .iter()
        .filter(|r| detect_platform(&r.url).is_some())
        .collect();

    supported
        .iter()
        .find(|r| r.name == "origin")
        .or_else(|| supported.first())
        .map(|r| (*r).clone())
        .ok_or(Error::NoSupportedRemotes)
}

fn split_remote(url: &str) -> Option<(String, String)> {
    if url.contains("://") {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        return Some((host, parsed.path().to_string()));
    }

    let caps = SCP_RE.captures(url)?;
    Some((caps["host"].to_lowercase(), caps["path"].to_string()))
}

fn platform_for_host(host: &str) -> Option<Platform> {
    if host == "github.com" || env_host_matches("GH_HOST", host) {
        return Some(Platform::GitHub);
    }
    if host == "gitlab.com" || env_host_matches("GITLAB_HOST", host) || host.contains("gitlab") {
        return Some(Platform::GitLab);
    }
    None
}

fn env_host_matches(var: &str, host: &str) -> bool {
    env::var(var).is_ok_and(|value| {
        let value = value.trim();
        let value = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"))
            .unwrap_or(value);
        value.trim_end_matches('/').eq_ignore_ascii_case(host)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str, url: &str) -> GitRemote {
        GitRemote {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_github_ssh() {
        let config = parse_repo_info("git@github.com:acme/widgets.git").unwrap();
        assert_eq!(config.platform, Platform::GitHub);
        assert_eq!(config.owner, "acme");
        assert_eq!(config.repo, "widgets");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_github_https_without_suffix() {
        let config = parse_repo_info("https://github.com/acme/widgets/").unwrap();
        assert_eq!(config.owner, "acme");
        assert_eq!(config.repo, "widgets");
    }

    #[test]
    fn test_gitlab_nested_groups() {
        let config = parse_repo_info("https://gitlab.com/group/sub/project.git").unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.owner, "group/sub");
        assert_eq!(config.repo, "project");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_self_hosted_gitlab_keeps_host() {
        let config = parse_repo_info("ssh://git@gitlab.example.com:2222/team/app.git").unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.host.as_deref(), Some("gitlab.example.com"));
    }

    #[test]
    fn test_unknown_host() {
        assert_eq!(detect_platform("https://bitbucket.org/a/b.git"), None);
        assert!(matches!(
            parse_repo_info("https://bitbucket.org/a/b.git"),
            Err(Error::NoSupportedRemotes)
        ));
    }

    #[test]
    fn test_missing_repo_segment() {
        assert!(parse_repo_info("https://github.com/acme").is_err());
    }

    #[test]
    fn test_select_prefers_origin() {
        let remotes = [
            remote("upstream", "git@github.com:up/widgets.git"),
            remote("origin", "git@github.com:me/widgets.git"),
        ];
        assert_eq!(select_remote(&remotes, None).unwrap().name, "origin");
    }

    #[test]
    fn test_select_skips_unsupported() {
        let remotes = [
            remote("origin", "https://bitbucket.org/me/widgets.git"),
            remote("mirror", "https://gitlab.com/me/widgets.git"),
        ];
        assert_eq!(select_remote(&remotes, None).unwrap().name, "mirror");
    }

    #[test]
    fn test_select_errors() {
        assert!(matches!(select_remote(&[], None), Err(Error::NoSupportedRemotes)));
        let remotes = [remote("origin", "git@github.com:me/widgets.git")];
        assert!(matches!(
            select_remote(&remotes, Some("fork")),
            Err(Error::RemoteNotFound(name)) if name == "fork"
        ));
    }
}
