//! Package managers: extract dependencies from manifest files
//!
//! A manager owns a set of file patterns and knows how to pull
//! dependencies out of matching files. Extraction is pure; the only I/O
//! here is walking the repository in [`extract_all`].

mod conan;
mod kubernetes;

pub use conan::ConanManager;
pub use kubernetes::KubernetesManager;

use crate::error::Result;
use crate::types::PackageFile;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::hash::BuildHasher;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Directories never scanned for manifests
const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// Manifest extractor for one ecosystem
pub trait Manager: Send + Sync {
    /// Manager name used in config (e.g. "kubernetes")
    fn name(&self) -> &'static str;

    /// Language/ecosystem label
    fn language(&self) -> &'static str;

    /// Regex patterns (matched against repo-relative paths) used when the
    /// config does not override them
    fn default_file_match(&self) -> Vec<String>;

    /// Datasources this manager produces dependencies for
    fn supported_datasources(&self) -> Vec<&'static str>;

    /// Extract dependencies from one file. `None` means "not a manifest of
    /// this kind" or "no dependencies".
    fn extract_package_file(&self, content: &str, file_path: &str) -> Option<PackageFile>;
}

/// All built-in managers
pub fn all_managers() -> Vec<Box<dyn Manager>> {
    vec![Box::new(ConanManager), Box::new(KubernetesManager)]
}

/// Built-in managers, restricted to `enabled` when given
pub fn enabled_managers(enabled: Option<&[String]>) -> Vec<Box<dyn Manager>> {
    all_managers()
        .into_iter()
        .filter(|m| enabled.is_none_or(|names| names.iter().any(|n| n == m.name())))
        .collect()
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Into::into))
        .collect()
}

/// Walk `root` and run every manager over the files its patterns match
///
/// `file_match` overrides a manager's default patterns by manager name.
pub fn extract_all<S: BuildHasher>(
    root: &Path,
    managers: &[Box<dyn Manager>],
    file_match: &HashMap<String, Vec<String>, S>,
) -> Result<Vec<PackageFile>> {
    let mut matchers = Vec::new();
    for manager in managers {
        let patterns = file_match
            .get(manager.name())
            .cloned()
            .unwrap_or_else(|| manager.default_file_match());
        if patterns.is_empty() {
            debug!(manager = manager.name(), "no file patterns, skipping manager");
            continue;
        }
        matchers.push((manager.as_ref(), compile_patterns(&patterns)?));
    }

    let mut package_files = Vec::new();
    if matchers.is_empty() {
        return Ok(package_files);
    }

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));

    for entry in walker {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        for (manager, patterns) in &matchers {
            if !patterns.iter().any(|re| re.is_match(&relative)) {
                continue;
            }
            trace!(manager = manager.name(), file = %relative, "matched manifest");
            let content = match fs::read_to_string(entry.path()) {
                Ok(c) => c,
                Err(e) => {
                    debug!(file = %relative, error = %e, "could not read manifest");
                    continue;
                }
            };
            if let Some(package_file) = manager.extract_package_file(&content, &relative) {
                debug!(
                    manager = manager.name(),
                    file = %relative,
                    deps = package_file.deps.len(),
                    "extracted dependencies"
                );
                package_files.push(package_file);
            }
        }
    }

    Ok(package_files)
}
