//! Automerge command - merge an update branch once its checks pass

use crate::cli::GlobalOptions;
use crate::cli::context::{CommandContext, PlatformContext};
use crate::cli::style::{Stylize, check, hyperlink};
use anstream::println;
use depbump::automerge::{branch_outcome_needs_pr, try_branch_automerge};
use depbump::config::BranchConfig;
use depbump::error::{Error, Result};
use depbump::types::AutomergeResult;
use dialoguer::Confirm;
use tracing::info;

/// Options for the automerge command
#[derive(Debug, Clone, Default)]
pub struct AutomergeOptions {
    /// Git remote to use
    pub remote: Option<String>,
    /// Skip CI status checks
    pub ignore_tests: bool,
    /// Prompt before opening a fallback PR
    pub confirm: bool,
}

/// Run the automerge command
pub async fn run_automerge(
    global: &GlobalOptions,
    branch: &str,
    options: AutomergeOptions,
) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let mut branch_config = BranchConfig::from_repo(&ctx.config, branch);
    if options.ignore_tests {
        branch_config.ignore_tests = true;
    }

    let remote = PlatformContext::new(&ctx, options.remote.as_deref()).await?;
    println!(
        "{} {} into {} ({})",
        "Automerging".emphasis(),
        branch.accent(),
        remote.base_branch.accent(),
        remote.remote_name.muted()
    );

    let result = try_branch_automerge(&branch_config, remote.platform.as_ref(), &remote.git).await?;
    print_result(result);

    if !branch_outcome_needs_pr(result) {
        return Ok(());
    }

    if branch_config.dry_run {
        info!("DRY-RUN: Would create PR for branch {branch}");
        return Ok(());
    }

    if options.confirm
        && !Confirm::new()
            .with_prompt(format!("Open a PR for {branch}?"))
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
    {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    let title = format!("Update {}", branch.trim_start_matches(&ctx.config.branch_prefix));
    let body = format!("Branch automerge of `{branch}` ended with: {result}.");
    let pr = remote
        .platform
        .create_pr(branch, &remote.base_branch, &title, Some(&body))
        .await?;
    println!(
        "{} Opened PR #{}: {}",
        check(),
        pr.number,
        hyperlink(&pr.title, &pr.html_url)
    );
    Ok(())
}

fn print_result(result: AutomergeResult) {
    let label = result.as_str();
    match result {
        AutomergeResult::Automerged => println!("{} {}", check(), label.success()),
        AutomergeResult::BranchStatusError | AutomergeResult::Failed => {
            println!("{} {}", "✗".error(), label.error());
        }
        AutomergeResult::Stale | AutomergeResult::NotReady => println!("{}", label.warn()),
        AutomergeResult::AbortedPrExists | AutomergeResult::NoAutomerge => {
            println!("{}", label.muted());
        }
    }
}
