//! Loose semver ordering for registry versions
//!
//! Registries publish versions like `1.2`, `v3.0.1` or `2.1.0-rc1`. These are
//! coerced into semver before comparing; anything that still does not parse
//! is never considered an update.

use semver::Version;

/// Parse a version, tolerating a leading `v` and missing minor/patch parts.
pub fn parse_loose(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(v) = Version::parse(trimmed) {
        return Some(v);
    }

    // Split off prerelease/build suffix, pad the numeric core.
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&format!("{padded}{suffix}")).ok()
}

/// Whether `candidate` is strictly newer than `current`.
pub fn is_greater_than(candidate: &str, current: &str) -> bool {
    match (parse_loose(candidate), parse_loose(current)) {
        (Some(c), Some(cur)) => c > cur,
        _ => false,
    }
}

/// Highest release newer than `current`.
///
/// Prereleases are only offered when `current` is itself a prerelease.
pub fn latest_update<'a, I>(current: &str, releases: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let current_version = parse_loose(current)?;
    let allow_prerelease = !current_version.pre.is_empty();

    releases
        .into_iter()
        .filter_map(|raw| parse_loose(raw).map(|v| (raw, v)))
        .filter(|(_, v)| allow_prerelease || v.pre.is_empty())
        .filter(|(_, v)| *v > current_version)
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(raw, _)| raw)
}
