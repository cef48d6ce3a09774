//! Update lookup: join extracted dependencies with datasource releases

use crate::cache::PackageCache;
use crate::datasource::{Datasource, get_datasource, get_pkg_releases};
use crate::error::Error;
use crate::types::{PackageFile, UpdateCandidate};
use crate::versioning::latest_update;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;
use tracing::{debug, warn};

/// Datasource instances keyed by id, created on first use
pub struct DatasourceRegistry {
    cache: Arc<PackageCache>,
    instances: HashMap<String, Option<Box<dyn Datasource>>>,
}

impl DatasourceRegistry {
    /// Create a registry whose datasources share `cache`
    pub fn new(cache: Arc<PackageCache>) -> Self {
        Self {
            cache,
            instances: HashMap::new(),
        }
    }

    /// Create a registry from pre-built datasources (no lazy creation)
    pub fn with_datasources(cache: Arc<PackageCache>, datasources: Vec<Box<dyn Datasource>>) -> Self {
        let instances = datasources
            .into_iter()
            .map(|ds| (ds.id().to_string(), Some(ds)))
            .collect();
        Self { cache, instances }
    }

    /// Get the datasource for `id`, or `None` if it is not implemented
    pub fn get(&mut self, id: &str) -> Option<&dyn Datasource> {
        if !self.instances.contains_key(id) {
            let created = match get_datasource(id, Arc::clone(&self.cache)) {
                Ok(ds) => Some(ds),
                Err(Error::UnknownDatasource(_)) => {
                    debug!(datasource = id, "no datasource implementation");
                    None
                }
                Err(e) => {
                    warn!(datasource = id, error = %e, "failed to create datasource");
                    None
                }
            };
            self.instances.insert(id.to_string(), created);
        }
        self.instances.get(id).and_then(|ds| ds.as_deref())
    }
}

/// Find the newest release for every dependency that can be looked up
///
/// `registry_urls` overrides datasource defaults by datasource id.
/// Dependencies with a skip reason, no current version, or an unknown
/// datasource are skipped.
pub async fn lookup_updates<S: BuildHasher>(
    package_files: &[PackageFile],
    registry: &mut DatasourceRegistry,
    registry_urls: &HashMap<String, Vec<String>, S>,
) -> Vec<UpdateCandidate> {
    let mut candidates = Vec::new();

    for file in package_files {
        for dep in &file.deps {
            if let Some(reason) = &dep.skip_reason {
                debug!(dep = %dep.dep_name, reason = %reason, "skipping dependency");
                continue;
            }
            let Some(current) = dep.current_value.as_deref() else {
                debug!(dep = %dep.dep_name, "no current version, skipping");
                continue;
            };
            let Some(datasource) = registry.get(&dep.datasource) else {
                continue;
            };

            let urls = registry_urls
                .get(&dep.datasource)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let Some(result) = get_pkg_releases(datasource, dep.lookup_name(), urls).await else {
                continue;
            };

            if let Some(new_value) = latest_update(current, result.versions()) {
                debug!(dep = %dep.dep_name, current, new_value, "update available");
                candidates.push(UpdateCandidate {
                    dep_name: dep.dep_name.clone(),
                    datasource: dep.datasource.clone(),
                    file_path: file.file_path.clone(),
                    current_value: current.to_string(),
                    new_value: new_value.to_string(),
                });
            }
        }
    }

    candidates
}
