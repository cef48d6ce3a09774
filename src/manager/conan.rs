//! conanfile.txt manager

use crate::manager::Manager;
use crate::types::{PackageDependency, PackageFile};
use regex::Regex;
use std::sync::LazyLock;

/// `name/version[@user/channel][#revision]`
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z0-9_\-.+]+)/(?P<version>\[[^\]]*\]|[^@#\s]+)(?P<userChannel>@[^#\s]+/[^#\s]+)?(?:#\S+)?$",
    )
    .expect("conan reference pattern is valid")
});

/// Sections whose lines are package references
const REQUIRE_SECTIONS: &[&str] = &["requires", "build_requires", "tool_requires"];

/// Manager for `conanfile.txt`
pub struct ConanManager;

fn parse_reference(line: &str) -> Option<PackageDependency> {
    let caps = REFERENCE_RE.captures(line)?;
    let name = caps.name("name")?.as_str();
    let version = caps.name("version")?.as_str();
    let user_channel = caps.name("userChannel").map_or("@_/_", |m| m.as_str());

    let skip_reason = version
        .starts_with('[')
        .then(|| "version-range".to_string());

    Some(PackageDependency {
        dep_name: name.to_string(),
        current_value: Some(version.to_string()),
        datasource: "conan".to_string(),
        lookup_name: Some(format!("{name}/{version}{user_channel}")),
        current_digest: None,
        skip_reason,
    })
}

/// Drop a trailing comment
///
/// `#` only opens a comment at the start of a line or after whitespace;
/// `zlib/1.2.11#<rev>` is a reference with a recipe revision.
fn strip_comment(line: &str) -> &str {
    let mut prev = None;
    for (i, c) in line.char_indices() {
        if c == '#' && prev.is_none_or(char::is_whitespace) {
            return &line[..i];
        }
        prev = Some(c);
    }
    line
}

impl Manager for ConanManager {
    fn name(&self) -> &'static str {
        "conan"
    }

    fn language(&self) -> &'static str {
        "c++"
    }

    fn default_file_match(&self) -> Vec<String> {
        vec![r"(^|/)conanfile\.txt$".to_string()]
    }

    fn supported_datasources(&self) -> Vec<&'static str> {
        vec!["conan"]
    }

    fn extract_package_file(&self, content: &str, file_path: &str) -> Option<PackageFile> {
        let mut in_requires = false;
        let mut deps = Vec::new();

        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                // `[requires]` headers vs version ranges like `[>1.0]` on a dep line
                if !section.contains('/') {
                    in_requires = REQUIRE_SECTIONS.contains(&section.trim());
                    continue;
                }
            }
            if in_requires && let Some(dep) = parse_reference(line) {
                deps.push(dep);
            }
        }

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
