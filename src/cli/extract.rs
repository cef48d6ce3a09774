//! Extract command - list dependencies found in the repository

use crate::cli::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use depbump::error::{Error, Result};
use depbump::manager::{enabled_managers, extract_all};
use depbump::types::PackageFile;

/// Run the extract command
pub fn run_extract(global: &GlobalOptions, json: bool) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let package_files = extract(&ctx)?;

    if json {
        let out = serde_json::to_string_pretty(&package_files)
            .map_err(|e| Error::Internal(format!("failed to serialize: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    print_package_files(&package_files);
    Ok(())
}

/// Run the enabled managers over the repository
pub fn extract(ctx: &CommandContext) -> Result<Vec<PackageFile>> {
    let managers = enabled_managers(ctx.config.enabled_managers.as_deref());
    extract_all(&ctx.repo_root, &managers, &ctx.config.file_match)
}

fn print_package_files(package_files: &[PackageFile]) {
    if package_files.is_empty() {
        println!("{}", "No dependencies found".muted());
        return;
    }

    for file in package_files {
        println!(
            "{} {}",
            file.file_path.emphasis(),
            format!("({})", file.manager).muted()
        );
        for dep in &file.deps {
            let version = dep.current_value.as_deref().unwrap_or("-");
            match &dep.skip_reason {
                Some(reason) => println!(
                    "  {} {} {}",
                    dep.dep_name,
                    version.muted(),
                    format!("[skipped: {reason}]").warn()
                ),
                None => println!("  {} {}", dep.dep_name, version.accent()),
            }
        }
    }
}
