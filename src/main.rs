//! repocache - archive-cache accelerated checkouts
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use repocache::cli::{Cli, Commands};
use repocache::config::ConfigManager;
use repocache::error::RepoCacheResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RepoCacheResult<()> {
    let cli = Cli::parse();

    // Load configuration first, it picks the log format
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("repocache=warn"),
        1 => EnvFilter::new("repocache=info"),
        _ => EnvFilter::new("repocache=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    // Dispatch to command
    match cli.command {
        Commands::RepoCheckout(args) => repocache::cli::commands::repo_checkout(args, &config).await,
        Commands::Checkout(args) => repocache::cli::commands::checkout(args, &config).await,
        Commands::Key(args) => repocache::cli::commands::key(args, &config).await,
        Commands::Stats(args) => repocache::cli::commands::stats(args, &config).await,
        Commands::Config(args) => {
            repocache::cli::commands::config(args, &config_manager, &config).await
        }
    }
}
