//! Repository configuration
//!
//! Loaded from `depbump.toml` at the repository root (or an explicit path)
//! and then overridden by CLI flags.

use crate::cache::DEFAULT_TTL_MINUTES;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename at the repository root
pub const CONFIG_FILE: &str = "depbump.toml";

/// Prefix for update branches
pub const DEFAULT_BRANCH_PREFIX: &str = "depbump/";

/// How an update gets merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomergeType {
    /// Merge the branch directly, no PR
    #[default]
    Branch,
    /// Merge through a pull request
    Pr,
}

impl std::fmt::Display for AutomergeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Branch => write!(f, "branch"),
            Self::Pr => write!(f, "pr"),
        }
    }
}

/// Repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Log intended actions instead of performing them
    pub dry_run: bool,
    /// Branch updates merge into (defaults to the remote's default branch)
    pub base_branch: Option<String>,
    /// Prefix for update branch names
    pub branch_prefix: String,
    /// Whether updates may be merged automatically
    pub automerge: bool,
    /// Branch or PR automerge
    pub automerge_type: AutomergeType,
    /// Treat the branch as green without checking CI
    pub ignore_tests: bool,
    /// Package cache directory
    pub cache_dir: Option<PathBuf>,
    /// Package cache time-to-live
    pub cache_ttl_minutes: i64,
    /// Managers to run (all when unset)
    pub enabled_managers: Option<Vec<String>>,
    /// File pattern overrides per manager
    pub file_match: HashMap<String, Vec<String>>,
    /// Registry URL overrides per datasource
    pub registry_urls: HashMap<String, Vec<String>>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            base_branch: None,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            automerge: false,
            automerge_type: AutomergeType::Branch,
            ignore_tests: false,
            cache_dir: None,
            cache_ttl_minutes: DEFAULT_TTL_MINUTES,
            enabled_managers: None,
            file_match: HashMap::new(),
            registry_urls: HashMap::new(),
        }
    }
}

impl RepoConfig {
    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load `path`, or `<repo_root>/depbump.toml` when `path` is `None`.
    ///
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(repo_root: &Path, path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (repo_root.join(CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                return Err(Error::Config(format!("{} not found", path.display())));
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Inputs for a single branch automerge attempt
#[derive(Debug, Clone)]
pub struct BranchConfig {
    /// Update branch name
    pub branch_name: String,
    /// Whether automerge is enabled
    pub automerge: bool,
    /// Branch or PR automerge
    pub automerge_type: AutomergeType,
    /// Skip CI status checks
    pub ignore_tests: bool,
    /// Simulate merges
    pub dry_run: bool,
}

impl BranchConfig {
    /// Build a branch config from repo settings
    pub fn from_repo(config: &RepoConfig, branch_name: impl Into<String>) -> Self {
        Self {
            branch_name: branch_name.into(),
            automerge: config.automerge,
            automerge_type: config.automerge_type,
            ignore_tests: config.ignore_tests,
            dry_run: config.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RepoConfig::default();
        assert!(!config.automerge);
        assert_eq!(config.automerge_type, AutomergeType::Branch);
        assert_eq!(config.cache_ttl_minutes, 30);
        assert_eq!(config.branch_prefix, "depbump/");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RepoConfig::from_toml(
            r#"
automerge = true
automerge_type = "pr"

[file_match]
kubernetes = ["^k8s/"]

[registry_urls]
conan = ["https://conan.example.com/"]
"#,
        )
        .unwrap();

        assert!(config.automerge);
        assert_eq!(config.automerge_type, AutomergeType::Pr);
        assert_eq!(config.file_match["kubernetes"], vec!["^k8s/"]);
        assert_eq!(config.registry_urls["conan"], vec!["https://conan.example.com/"]);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_invalid_automerge_type_is_error() {
        let result = RepoConfig::from_toml("automerge_type = \"squash\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_missing_default_file() {
        let temp = TempDir::new().unwrap();
        let config = RepoConfig::load(temp.path(), None).unwrap();
        assert!(!config.automerge);
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(RepoConfig::load(temp.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_load_repo_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "ignore_tests = true\n").unwrap();
        let config = RepoConfig::load(temp.path(), None).unwrap();
        assert!(config.ignore_tests);
    }

    #[test]
    fn test_branch_config_from_repo() {
        let repo = RepoConfig {
            automerge: true,
            dry_run: true,
            ..Default::default()
        };
        let branch = BranchConfig::from_repo(&repo, "depbump/zlib-1.3");
        assert!(branch.automerge);
        assert!(branch.dry_run);
        assert_eq!(branch.branch_name, "depbump/zlib-1.3");
    }
}
