//! Datasources: registry clients that map a package name to its releases
//!
//! Each datasource knows its default registries and how to query them.
//! Lookups never fail loudly: transport and parse errors go through
//! [`handle_generic_errors`] and become "no releases".

mod conan;

pub use conan::{CONAN_DEFAULT_REGISTRY, ConanDatasource};

use crate::cache::PackageCache;
use crate::error::{Error, Result};
use crate::types::{Release, ReleaseResult};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How results from several registries are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStrategy {
    /// Use the first registry that returns something
    First,
    /// Query every registry and concatenate releases
    Merge,
}

/// Input for a single registry lookup
#[derive(Debug, Clone)]
pub struct GetReleasesConfig {
    /// Registry base URL
    pub registry_url: String,
    /// Datasource-specific package identifier
    pub lookup_name: String,
}

/// Registry client trait
#[async_trait]
pub trait Datasource: Send + Sync {
    /// Datasource id (e.g. "conan")
    fn id(&self) -> &'static str;

    /// Registries queried when none are configured
    fn default_registry_urls(&self) -> Vec<String>;

    /// Whether lookups are memoized in the package cache
    fn caching(&self) -> bool {
        false
    }

    /// How results from multiple registries combine
    fn registry_strategy(&self) -> RegistryStrategy {
        RegistryStrategy::First
    }

    /// Fetch releases for one package from one registry.
    ///
    /// Returns `None` when nothing was found or the lookup failed.
    async fn get_releases(&self, config: &GetReleasesConfig) -> Option<ReleaseResult>;
}

/// Build the HTTP client shared by datasources
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("depbump/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Datasource(format!("failed to create HTTP client: {e}")))
}

/// Log a lookup failure. Callers treat the lookup as "not found" afterwards.
///
/// Rate limiting and server errors point at the registry host rather than the
/// package, so they are logged louder.
pub fn handle_generic_errors(datasource: &str, lookup_name: &str, err: &Error) {
    match err.status_code() {
        Some(status) if status == 429 || status >= 500 => {
            warn!(datasource, lookup_name, status, error = %err, "registry host error");
        }
        Some(status) => {
            debug!(datasource, lookup_name, status, error = %err, "registry lookup failed");
        }
        None => {
            debug!(datasource, lookup_name, error = %err, "registry lookup failed");
        }
    }
}

/// Look up a built-in datasource by id
pub fn get_datasource(id: &str, cache: Arc<PackageCache>) -> Result<Box<dyn Datasource>> {
    match id {
        ConanDatasource::ID => Ok(Box::new(ConanDatasource::new(http_client()?, cache))),
        other => Err(Error::UnknownDatasource(other.to_string())),
    }
}

/// Query every applicable registry for a package
///
/// `registry_urls` overrides the datasource defaults when non-empty.
pub async fn get_pkg_releases(
    datasource: &dyn Datasource,
    lookup_name: &str,
    registry_urls: &[String],
) -> Option<ReleaseResult> {
    let registries = if registry_urls.is_empty() {
        datasource.default_registry_urls()
    } else {
        registry_urls.to_vec()
    };

    let mut merged: Vec<Release> = Vec::new();
    let mut seen = HashSet::new();

    for registry_url in registries {
        let config = GetReleasesConfig {
            registry_url,
            lookup_name: lookup_name.to_string(),
        };
        let Some(result) = datasource.get_releases(&config).await else {
            continue;
        };
        match datasource.registry_strategy() {
            RegistryStrategy::First => return Some(result),
            RegistryStrategy::Merge => {
                for release in result.releases {
                    if seen.insert(release.version.clone()) {
                        merged.push(release);
                    }
                }
            }
        }
    }

    if merged.is_empty() {
        debug!(datasource = datasource.id(), lookup_name, "no releases found");
        None
    } else {
        Some(ReleaseResult { releases: merged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedDatasource {
        strategy: RegistryStrategy,
        responses: HashMap<String, Vec<&'static str>>,
    }

    #[async_trait]
    impl Datasource for FixedDatasource {
        fn id(&self) -> &'static str {
            "fixed"
        }

        fn default_registry_urls(&self) -> Vec<String> {
            vec!["https://a/".to_string(), "https://b/".to_string()]
        }

        fn registry_strategy(&self) -> RegistryStrategy {
            self.strategy
        }

        async fn get_releases(&self, config: &GetReleasesConfig) -> Option<ReleaseResult> {
            self.responses.get(&config.registry_url).map(|versions| ReleaseResult {
                releases: versions
                    .iter()
                    .map(|v| Release {
                        version: (*v).to_string(),
                    })
                    .collect(),
            })
        }
    }

    fn fixed(strategy: RegistryStrategy) -> FixedDatasource {
        let mut responses = HashMap::new();
        responses.insert("https://a/".to_string(), vec!["1.0", "1.1"]);
        responses.insert("https://b/".to_string(), vec!["1.1", "2.0"]);
        FixedDatasource {
            strategy,
            responses,
        }
    }

    #[tokio::test]
    async fn test_merge_strategy_dedupes_across_registries() {
        let ds = fixed(RegistryStrategy::Merge);
        let result = get_pkg_releases(&ds, "pkg", &[]).await.unwrap();
        let versions: Vec<_> = result.versions().collect();
        assert_eq!(versions, vec!["1.0", "1.1", "2.0"]);
    }

    #[tokio::test]
    async fn test_first_strategy_stops_at_first_hit() {
        let ds = fixed(RegistryStrategy::First);
        let result = get_pkg_releases(&ds, "pkg", &[]).await.unwrap();
        let versions: Vec<_> = result.versions().collect();
        assert_eq!(versions, vec!["1.0", "1.1"]);
    }

    #[tokio::test]
    async fn test_configured_registries_override_defaults() {
        let ds = fixed(RegistryStrategy::Merge);
        let result = get_pkg_releases(&ds, "pkg", &["https://b/".to_string()])
            .await
            .unwrap();
        let versions: Vec<_> = result.versions().collect();
        assert_eq!(versions, vec!["1.1", "2.0"]);
    }

    #[tokio::test]
    async fn test_no_registry_answers_is_none() {
        let ds = fixed(RegistryStrategy::Merge);
        let result = get_pkg_releases(&ds, "pkg", &["https://c/".to_string()]).await;
        assert!(result.is_none());
    }

    #[test]
    fn test_unknown_datasource_is_error() {
        let cache = Arc::new(PackageCache::new());
        match get_datasource("docker", cache) {
            Err(Error::UnknownDatasource(id)) => assert_eq!(id, "docker"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("docker datasource should not exist"),
        }
    }
}
