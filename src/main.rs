//! depbump CLI

mod cli;

use anstream::eprintln;
use clap::{Parser, Subcommand};
use cli::style::Stylize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "depbump")]
#[command(about = "Keep repository dependencies up to date", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the repository (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    path: PathBuf,

    /// Config file (defaults to depbump.toml in the repository)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log intended actions instead of performing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dependencies found in the repository
    Extract {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show published versions of a single package
    Lookup {
        /// Datasource id (e.g. conan)
        datasource: String,

        /// Package name as the datasource expects it (e.g. zlib/1.2.13@_/_)
        name: String,

        /// Registry URL(s) to query instead of the defaults
        #[arg(long = "registry-url")]
        registry_urls: Vec<String>,
    },

    /// List dependencies with newer releases available
    Updates {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Automerge an update branch if its checks pass
    Automerge {
        /// Update branch name
        branch: String,

        /// Git remote to use
        #[arg(long)]
        remote: Option<String>,

        /// Treat the branch as green without checking CI
        #[arg(long)]
        ignore_tests: bool,

        /// Ask before opening a PR for a branch that could not be merged
        #[arg(long)]
        confirm: bool,
    },

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        platform: AuthPlatform,
    },
}

#[derive(Subcommand)]
enum AuthPlatform {
    /// GitHub authentication
    Github {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// GitLab authentication
    Gitlab {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show where the token comes from
    Status,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "depbump=debug" } else { "depbump=info" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let global = cli::GlobalOptions {
        path: cli.path,
        config: cli.config,
        dry_run: cli.dry_run,
    };

    let result = match cli.command {
        Commands::Extract { json } => cli::run_extract(&global, json),
        Commands::Lookup {
            datasource,
            name,
            registry_urls,
        } => cli::run_lookup(&global, &datasource, &name, &registry_urls).await,
        Commands::Updates { json } => cli::run_updates(&global, json).await,
        Commands::Automerge {
            branch,
            remote,
            ignore_tests,
            confirm,
        } => {
            let options = cli::AutomergeOptions {
                remote,
                ignore_tests,
                confirm,
            };
            cli::run_automerge(&global, &branch, options).await
        }
        Commands::Auth { platform } => match platform {
            AuthPlatform::Github { action } => {
                cli::run_auth(cli::AuthTarget::GitHub, matches!(action, AuthAction::Test)).await
            }
            AuthPlatform::Gitlab { action } => {
                cli::run_auth(cli::AuthTarget::GitLab, matches!(action, AuthAction::Test)).await
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
