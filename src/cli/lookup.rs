//! Lookup and updates commands

use crate::cli::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::cli::extract::extract;
use crate::cli::style::{Stylize, arrow, check, spinner_style};
use anstream::println;
use depbump::datasource::{get_datasource, get_pkg_releases};
use depbump::error::{Error, Result};
use depbump::lookup::{DatasourceRegistry, lookup_updates};
use depbump::types::UpdateCandidate;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run the lookup command for a single package
pub async fn run_lookup(
    global: &GlobalOptions,
    datasource_id: &str,
    name: &str,
    registry_urls: &[String],
) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let datasource = get_datasource(datasource_id, Arc::clone(&ctx.cache))?;

    let urls: Vec<String> = if registry_urls.is_empty() {
        ctx.config
            .registry_urls
            .get(datasource_id)
            .cloned()
            .unwrap_or_default()
    } else {
        registry_urls.to_vec()
    };

    let progress = spinner(format!("Looking up {}...", name.emphasis()));
    let result = get_pkg_releases(datasource.as_ref(), name, &urls).await;
    progress.finish_and_clear();
    ctx.save_cache();

    let Some(result) = result else {
        println!("{}", format!("No releases found for {name}").muted());
        return Ok(());
    };

    println!(
        "{} {} release(s) of {}",
        check(),
        result.releases.len().accent(),
        name.emphasis()
    );
    for version in result.versions() {
        println!("  {version}");
    }
    Ok(())
}

/// Run the updates command
pub async fn run_updates(global: &GlobalOptions, json: bool) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let package_files = extract(&ctx)?;

    let dep_count: usize = package_files.iter().map(|f| f.deps.len()).sum();
    let progress = spinner(format!(
        "Checking {} dependencies...",
        dep_count.accent()
    ));
    let mut registry = DatasourceRegistry::new(Arc::clone(&ctx.cache));
    let candidates = lookup_updates(&package_files, &mut registry, &ctx.config.registry_urls).await;
    progress.finish_and_clear();
    ctx.save_cache();

    if json {
        let out = serde_json::to_string_pretty(&candidates)
            .map_err(|e| Error::Internal(format!("failed to serialize: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    print_candidates(&candidates, &ctx.config.branch_prefix);
    Ok(())
}

fn print_candidates(candidates: &[UpdateCandidate], branch_prefix: &str) {
    if candidates.is_empty() {
        println!("{}", "All dependencies are up to date".muted());
        return;
    }

    println!("{}:", "Updates available".emphasis());
    for candidate in candidates {
        println!(
            "  {} {} {} {}",
            candidate.dep_name,
            candidate.current_value.muted(),
            arrow(),
            candidate.new_value.success()
        );
        println!(
            "    {} {}",
            candidate.file_path.muted(),
            candidate.branch_name(branch_prefix).accent()
        );
    }
}
