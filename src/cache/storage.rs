//! Persistence for the package cache.

use super::{CACHE_VERSION, CacheSnapshot, PackageCache};
use crate::error::{Error, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename for the package cache.
const CACHE_FILE: &str = "package-cache.json";

/// Default cache directory (`<user cache dir>/depbump`).
///
/// Falls back to `.depbump-cache` in the working directory when the platform
/// has no cache dir.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(|| PathBuf::from(".depbump-cache"), |d| d.join("depbump"))
}

/// Get path to the cache file inside `dir`.
pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILE)
}

/// Load the package cache from disk.
///
/// Returns an empty cache if the file doesn't exist or was written by a
/// different format version.
pub fn load_cache(dir: &Path) -> Result<PackageCache> {
    let path = cache_path(dir);

    if !path.exists() {
        return Ok(PackageCache::new());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Cache(format!("failed to read {}: {e}", path.display())))?;

    let snapshot: CacheSnapshot = serde_json::from_str(&content)
        .map_err(|e| Error::Cache(format!("failed to parse {}: {e}", path.display())))?;

    if snapshot.version != CACHE_VERSION {
        debug!(
            found = snapshot.version,
            expected = CACHE_VERSION,
            "discarding package cache with different version"
        );
        return Ok(PackageCache::new());
    }

    Ok(PackageCache::from_snapshot(snapshot, Utc::now()))
}

/// Save the package cache to disk.
///
/// Creates `dir` if it doesn't exist.
pub fn save_cache(dir: &Path, cache: &PackageCache) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Cache(format!("failed to create {}: {e}", dir.display())))?;
    }

    let path = cache_path(dir);
    let content = serde_json::to_string_pretty(&cache.snapshot())
        .map_err(|e| Error::Cache(format!("failed to serialize package cache: {e}")))?;

    fs::write(&path, content)
        .map_err(|e| Error::Cache(format!("failed to write {}: {e}", path.display())))?;

    debug!(path = %path.display(), entries = cache.len(), "saved package cache");
    Ok(())
}
