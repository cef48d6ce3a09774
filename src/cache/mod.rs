//! Package cache
//!
//! Namespaced key/value store for datasource lookups. Values are stored as
//! JSON so any serializable result can be memoized, and every entry carries
//! its own expiry.

mod storage;

pub use storage::{cache_path, default_cache_dir, load_cache, save_cache};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Default time-to-live for cached lookups
pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Current on-disk cache format version
pub const CACHE_VERSION: u32 = 1;

/// A single cached value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached value
    pub value: serde_json::Value,
    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Serialized form of the whole cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Format version
    #[serde(default)]
    pub version: u32,
    /// namespace -> key -> entry
    #[serde(default)]
    pub namespaces: HashMap<String, HashMap<String, CacheEntry>>,
}

/// In-memory package cache shared by datasources
#[derive(Debug)]
pub struct PackageCache {
    namespaces: Mutex<HashMap<String, HashMap<String, CacheEntry>>>,
    ttl_minutes: i64,
}

impl Default for PackageCache {
    fn default() -> Self {
        Self {
            namespaces: Mutex::default(),
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }
}

impl PackageCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `minutes` as the lifetime datasources give new entries
    #[must_use]
    pub fn with_ttl(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Lifetime datasources give new entries
    pub const fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Rebuild a cache from a snapshot, dropping entries expired at `now`
    pub fn from_snapshot(snapshot: CacheSnapshot, now: DateTime<Utc>) -> Self {
        let mut namespaces = snapshot.namespaces;
        for entries in namespaces.values_mut() {
            entries.retain(|_, entry| !entry.is_expired(now));
        }
        namespaces.retain(|_, entries| !entries.is_empty());
        Self {
            namespaces: Mutex::new(namespaces),
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }

    /// Copy the current contents into a serializable snapshot
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            version: CACHE_VERSION,
            namespaces: self.lock().clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HashMap<String, CacheEntry>>> {
        self.namespaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry
    ///
    /// Returns `None` on a miss, an expired entry, or a value that does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        self.get_at(namespace, key, Utc::now())
    }

    fn get_at<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let mut namespaces = self.lock();
        let entries = namespaces.get_mut(namespace)?;
        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            entries.remove(key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value for `ttl_minutes`
    pub fn set<T: Serialize>(&self, namespace: &str, key: &str, value: &T, ttl_minutes: i64) {
        let Ok(value) = serde_json::to_value(value) else {
            trace!(namespace, key, "value not serializable, not caching");
            return;
        };
        let entry = CacheEntry {
            value,
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        };
        self.lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), entry);
    }

    /// Memoize an async computation under `namespace`/`key`
    ///
    /// Every result is cached, including `None` for `Option` outputs.
    pub async fn cached<T, F, Fut>(&self, namespace: &str, key: &str, ttl_minutes: i64, f: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(hit) = self.get::<T>(namespace, key) {
            trace!(namespace, key, "package cache hit");
            return hit;
        }
        trace!(namespace, key, "package cache miss");
        let value = f().await;
        self.set(namespace, key, &value, ttl_minutes);
        value
    }

    /// Number of stored entries across all namespaces
    pub fn len(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = PackageCache::new();
        cache.set("ns", "k", &vec!["1.0".to_string()], 30);
        let got: Option<Vec<String>> = cache.get("ns", "k");
        assert_eq!(got, Some(vec!["1.0".to_string()]));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let cache = PackageCache::new();
        cache.set("a", "k", &1u32, 30);
        assert_eq!(cache.get::<u32>("b", "k"), None);
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = PackageCache::new();
        cache.set("ns", "k", &1u32, 0);
        assert_eq!(cache.get::<u32>("ns", "k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_none_is_a_hit() {
        let cache = PackageCache::new();
        cache.set::<Option<u32>>("ns", "k", &None, 30);
        assert_eq!(cache.get::<Option<u32>>("ns", "k"), Some(None));
    }

    #[tokio::test]
    async fn test_cached_runs_computation_once() {
        let cache = PackageCache::new();
        let mut calls = 0;
        let first = cache
            .cached("ns", "k", 30, || {
                calls += 1;
                async { 42u32 }
            })
            .await;
        let second = cache.cached("ns", "k", 30, || async { 7u32 }).await;
        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_from_snapshot_drops_expired() {
        let now = Utc::now();
        let mut snapshot = CacheSnapshot::default();
        let entries = snapshot.namespaces.entry("ns".to_string()).or_default();
        entries.insert(
            "live".to_string(),
            CacheEntry {
                value: serde_json::json!(1),
                expires_at: now + Duration::minutes(5),
            },
        );
        entries.insert(
            "dead".to_string(),
            CacheEntry {
                value: serde_json::json!(2),
                expires_at: now - Duration::minutes(5),
            },
        );

        let cache = PackageCache::from_snapshot(snapshot, now);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at::<u32>("ns", "live", now), Some(1));
    }
}
