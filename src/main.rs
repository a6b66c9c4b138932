//! bundlekit - cached script and stylesheet bundling
//!
//! CLI entry point that dispatches to subcommands.

use bundlekit::cli::{Cli, Commands};
use bundlekit::config::ConfigManager;
use bundlekit::error::{BundleError, BundleResult};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
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

async fn run() -> BundleResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("bundlekit=warn"),
        1 => EnvFilter::new("bundlekit=info"),
        _ => EnvFilter::new("bundlekit=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| BundleError::io("getting current directory", e))?;
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // Dispatch to command
    match cli.command {
        Commands::Script(args) => bundlekit::cli::commands::script(args, &config).await,
        Commands::Style(args) => bundlekit::cli::commands::style(args, &config).await,
        Commands::Css(args) => bundlekit::cli::commands::css(args, &config).await,
        Commands::Cache(args) => bundlekit::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            bundlekit::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
