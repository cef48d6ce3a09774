//! Shared command context for CLI commands
//!
//! Loads the repository config and the package cache once, and for
//! platform commands resolves the remote and creates the service.

use crate::cli::GlobalOptions;
use crate::cli::style::Stylize;
use anstream::eprintln;
use depbump::cache::{PackageCache, default_cache_dir, load_cache, save_cache};
use depbump::config::RepoConfig;
use depbump::error::Result;
use depbump::git::{CliGit, GitOps};
use depbump::platform::{PlatformService, create_platform_service, parse_repo_info, select_remote};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Config and cache for commands that work on a repository
pub struct CommandContext {
    /// Repository root
    pub repo_root: PathBuf,
    /// Effective config (file values with CLI overrides applied)
    pub config: RepoConfig,
    /// Package cache shared by datasources
    pub cache: Arc<PackageCache>,
    cache_dir: PathBuf,
}

impl CommandContext {
    /// Load config and cache for the repository at `global.path`
    pub fn load(global: &GlobalOptions) -> Result<Self> {
        let repo_root = global.path.clone();
        let mut config = RepoConfig::load(&repo_root, global.config.as_deref())?;
        if global.dry_run {
            config.dry_run = true;
        }

        let cache_dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);
        let cache = match load_cache(&cache_dir) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable package cache");
                PackageCache::new()
            }
        };
        debug!(entries = cache.len(), dir = %cache_dir.display(), "package cache loaded");

        Ok(Self {
            repo_root,
            cache: Arc::new(cache.with_ttl(config.cache_ttl_minutes)),
            config,
            cache_dir,
        })
    }

    /// Persist the package cache; failures only warn
    pub fn save_cache(&self) {
        if let Err(e) = save_cache(&self.cache_dir, &self.cache) {
            eprintln!("{}", format!("⚠️  Failed to save package cache: {e}").warn());
        }
    }
}

/// Platform and git access for commands that talk to the remote
pub struct PlatformContext {
    /// Platform service (GitHub/GitLab)
    pub platform: Box<dyn PlatformService>,
    /// Local git operations
    pub git: CliGit,
    /// Selected remote name
    pub remote_name: String,
    /// Branch updates merge into
    pub base_branch: String,
}

impl PlatformContext {
    /// Select the remote, detect its platform and authenticate
    pub async fn new(ctx: &CommandContext, remote: Option<&str>) -> Result<Self> {
        let git = CliGit::new(&ctx.repo_root, "origin", ctx.config.base_branch.clone());

        let remotes = git.remotes().await?;
        let selected = select_remote(&remotes, remote)?;
        let git = git.with_remote(&selected.name);
        let platform_config = parse_repo_info(&selected.url)?;
        let platform = create_platform_service(&platform_config).await?;

        let base_branch = match &ctx.config.base_branch {
            Some(base) => base.clone(),
            None => git.default_branch().await?,
        };

        Ok(Self {
            platform,
            git,
            remote_name: selected.name,
            base_branch,
        })
    }
}
