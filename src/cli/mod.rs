//! CLI command implementations

mod auth;
mod automerge;
mod context;
mod extract;
mod lookup;
pub mod style;

pub use auth::{AuthTarget, run_auth};
pub use automerge::{AutomergeOptions, run_automerge};
pub use extract::run_extract;
pub use lookup::{run_lookup, run_updates};

use std::path::PathBuf;

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Repository path
    pub path: PathBuf,
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Dry-run requested on the command line
    pub dry_run: bool,
}
