//! Kubernetes manifest manager (container images)

use crate::manager::Manager;
use crate::types::{PackageDependency, PackageFile};
use regex::Regex;
use std::sync::LazyLock;

static API_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*apiVersion\s*:").expect("apiVersion pattern is valid")
});

static KIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*kind\s*:").expect("kind pattern is valid"));

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"^\s*-?\s*image\s*:\s*(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)'|(?P<bare>[^\s'"#]+))\s*(?:#.*)?$"##,
    )
    .expect("image pattern is valid")
});

/// Manager for Kubernetes manifests
///
/// Has no default file patterns: manifests are plain YAML and only the
/// repository knows where they live.
pub struct KubernetesManager;

/// Split `registry/name:tag@sha256:...` into name, tag and digest.
fn split_image(image: &str) -> (String, Option<String>, Option<String>) {
    let (rest, digest) = match image.split_once('@') {
        Some((rest, digest)) => (rest, Some(digest.to_string())),
        None => (image, None),
    };

    // A ':' before the last '/' is a registry port, not a tag.
    let name_start = rest.rfind('/').map_or(0, |i| i + 1);
    match rest[name_start..].rfind(':') {
        Some(i) => {
            let split = name_start + i;
            (
                rest[..split].to_string(),
                Some(rest[split + 1..].to_string()),
                digest,
            )
        }
        None => (rest.to_string(), None, digest),
    }
}

fn image_dependency(image: &str) -> PackageDependency {
    if image.contains("{{") || image.contains("${") {
        return PackageDependency {
            dep_name: image.to_string(),
            datasource: "docker".to_string(),
            skip_reason: Some("contains-variable".to_string()),
            ..Default::default()
        };
    }

    let (dep_name, current_value, current_digest) = split_image(image);
    PackageDependency {
        dep_name,
        current_value,
        datasource: "docker".to_string(),
        lookup_name: None,
        current_digest,
        skip_reason: None,
    }
}

impl Manager for KubernetesManager {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn language(&self) -> &'static str {
        "docker"
    }

    fn default_file_match(&self) -> Vec<String> {
        Vec::new()
    }

    fn supported_datasources(&self) -> Vec<&'static str> {
        vec!["docker"]
    }

    fn extract_package_file(&self, content: &str, file_path: &str) -> Option<PackageFile> {
        if !(API_VERSION_RE.is_match(content) && KIND_RE.is_match(content)) {
            return None;
        }

        let deps: Vec<PackageDependency> = content
            .lines()
            .filter_map(|line| IMAGE_RE.captures(line))
            .filter_map(|caps| {
                caps.name("dq")
                    .or_else(|| caps.name("sq"))
                    .or_else(|| caps.name("bare"))
                    .map(|m| image_dependency(m.as_str().trim()))
            })
            .collect();

        if deps.is_empty() {
            return None;
        }
        Some(PackageFile {
            manager: self.name().to_string(),
            file_path: file_path.to_string(),
            deps,
        })
    }
}
