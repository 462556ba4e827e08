//! Piste-Watch main entry point
//!
//! This is the command-line interface for the Piste-Watch price tracker.

use clap::Parser;
use piste_watch::config::{load_catalog, load_config_with_hash};
use piste_watch::{report, Watcher};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Piste-Watch: a single-variant price and availability watcher
///
/// Piste-Watch checks one product variant across the shops listed in the
/// site catalog, reports price and availability movements against the
/// previous run, and pushes notifications for real changes.
#[derive(Parser, Debug)]
#[command(name = "piste-watch")]
#[command(version = "1.0.0")]
#[command(about = "A product variant price and availability watcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Check and report without notifying or persisting state
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let sites = match load_catalog(&config.storage, &config.watch.target_sku) {
        Ok(sites) => sites,
        Err(e) => {
            tracing::error!("Failed to load site catalog: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        tracing::info!("Dry run: state and history will not be written");
    }

    let target_variant = config.watch.target_variant.clone();
    let watcher = Watcher::new(config)?;
    match watcher.run(&sites, cli.dry_run).await {
        Ok(outcome) => {
            report::print_report(&outcome.changes, &outcome.results, &target_variant);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Check failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("piste_watch=info,warn"),
            1 => EnvFilter::new("piste_watch=debug,info"),
            2 => EnvFilter::new("piste_watch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
