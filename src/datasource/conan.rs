//! Conan center / Artifactory conan v2 search datasource

use crate::cache::PackageCache;
use crate::datasource::{Datasource, GetReleasesConfig, RegistryStrategy, handle_generic_errors};
use crate::error::Result;
use crate::types::{Release, ReleaseResult};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::trace;
use url::Url;

/// Default public conan registry
pub const CONAN_DEFAULT_REGISTRY: &str = "https://center.conan.io/";

/// Channel assumed when a lookup name carries none
const DEFAULT_USER_CHANNEL: &str = "@_/_";

/// Matches `name/version@user/channel` search results
static CONAN_RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<name>[a-z\-_0-9]+)/(?P<version>[^@/\n]+)(?P<userChannel>@\S+/\S+)")
        .expect("conan result pattern is valid")
});

/// `results` is a list on conan center and an object on some Artifactory
/// versions. Only the string values matter either way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResults {
    List(Vec<serde_json::Value>),
    Map(serde_json::Map<String, serde_json::Value>),
}

impl Default for SearchResults {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl SearchResults {
    fn strings(&self) -> Vec<&str> {
        match self {
            Self::List(values) => values.iter().filter_map(serde_json::Value::as_str).collect(),
            Self::Map(map) => map.values().filter_map(serde_json::Value::as_str).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConanSearchResponse {
    #[serde(default)]
    results: SearchResults,
}

/// Conan datasource
pub struct ConanDatasource {
    client: Client,
    cache: Arc<PackageCache>,
}

impl ConanDatasource {
    /// Datasource id
    pub const ID: &'static str = "conan";

    /// Create a datasource using `client` for HTTP and `cache` for memoization
    pub const fn new(client: Client, cache: Arc<PackageCache>) -> Self {
        Self { client, cache }
    }

    fn cache_namespace() -> String {
        format!("datasource-{}", Self::ID)
    }

    async fn lookup_conan_package(
        &self,
        package_name: &str,
        host_url: &str,
        user_and_channel: &str,
    ) -> Option<ReleaseResult> {
        trace!(package_name, host_url, "looking up conan api dependency");

        match self.search(package_name, host_url).await {
            Ok(response) => {
                let releases = parse_search_results(&response.results.strings(), user_and_channel);
                Some(ReleaseResult { releases })
            }
            Err(err) => {
                handle_generic_errors(Self::ID, package_name, &err);
                None
            }
        }
    }

    async fn search(&self, package_name: &str, host_url: &str) -> Result<ConanSearchResponse> {
        let lookup_url = search_url(host_url, package_name)?;
        trace!(%lookup_url, "conan api lookup");

        let response = self
            .client
            .get(lookup_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        trace!(%lookup_url, "got conan api result");
        Ok(response)
    }
}

/// Split a lookup name like `poco/1.2@user/channel` into the package name
/// and the `@user/channel` suffix.
pub fn split_lookup_name(lookup_name: &str) -> (&str, String) {
    let dep_name = lookup_name.split('/').next().unwrap_or(lookup_name);
    let user_and_channel = lookup_name
        .split_once('@')
        .map_or_else(|| DEFAULT_USER_CHANNEL.to_string(), |(_, rest)| format!("@{rest}"));
    (dep_name, user_and_channel)
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn search_url(host_url: &str, package_name: &str) -> Result<Url> {
    let base = Url::parse(&ensure_trailing_slash(host_url))?;
    let mut url = base.join("v2/conans/search")?;
    url.query_pairs_mut().append_pair("q", package_name);
    Ok(url)
}

/// Keep the versions of result lines whose channel equals `user_and_channel`,
/// in input order.
fn parse_search_results(results: &[&str], user_and_channel: &str) -> Vec<Release> {
    results
        .iter()
        .filter_map(|line| CONAN_RESULT_RE.captures(line))
        .filter_map(|caps| {
            let version = caps.name("version")?.as_str();
            let channel = caps.name("userChannel")?.as_str();
            (channel == user_and_channel).then(|| Release {
                version: version.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl Datasource for ConanDatasource {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn default_registry_urls(&self) -> Vec<String> {
        vec![CONAN_DEFAULT_REGISTRY.to_string()]
    }

    fn caching(&self) -> bool {
        true
    }

    fn registry_strategy(&self) -> RegistryStrategy {
        RegistryStrategy::Merge
    }

    async fn get_releases(&self, config: &GetReleasesConfig) -> Option<ReleaseResult> {
        let (dep_name, user_and_channel) = split_lookup_name(&config.lookup_name);
        let key = format!("{}:{}release", config.registry_url, config.lookup_name);

        let lookup = || self.lookup_conan_package(dep_name, &config.registry_url, &user_and_channel);
        let result = if self.caching() {
            self.cache
                .cached(&Self::cache_namespace(), &key, self.cache.ttl_minutes(), lookup)
                .await
        } else {
            lookup().await
        };

        result.filter(|r| !r.releases.is_empty())
    }
}
