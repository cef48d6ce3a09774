//! Error types for depbump

use thiserror::Error;

/// Errors produced by depbump
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(String),

    /// GitHub API failure
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API failure
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Generic platform failure (used by non-HTTP platform implementations)
    #[error("platform error: {0}")]
    Platform(String),

    /// No token could be found for a platform
    #[error("authentication error: {0}")]
    Auth(String),

    /// A git command failed; carries git's own message
    #[error("{0}")]
    Git(String),

    /// Datasource lookup failure
    #[error("datasource error: {0}")]
    Datasource(String),

    /// Requested datasource id is not implemented
    #[error("unknown datasource: {0}")]
    UnknownDatasource(String),

    /// Package cache could not be read or written
    #[error("cache error: {0}")]
    Cache(String),

    /// Remote URL did not match a supported platform
    #[error("no supported remotes found (GitHub or GitLab)")]
    NoSupportedRemotes,

    /// Named remote does not exist
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// octocrab failure
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Malformed URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid regular expression in a file pattern
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Anything that should not happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code behind this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
