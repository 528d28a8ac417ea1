//! Solution-Spider main entry point
//!
//! This is the command-line interface for the Solution-Spider harvester.

use anyhow::Context;
use clap::Parser;
use solution_spider::config::{load_config_with_hash, Config};
use solution_spider::crawler::{harvest, should_discover, HarvestOptions};
use solution_spider::storage::{open_store, LinkLog};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Solution-Spider: a resumable submission harvester
///
/// Solution-Spider walks a judge's paginated submission listing, logs every
/// solution link, then downloads and files each submission's source by
/// verdict and language. Interrupted runs pick up where they stopped.
#[derive(Parser, Debug)]
#[command(name = "solution-spider")]
#[command(version = "1.0.0")]
#[command(about = "A resumable submission harvester", long_about = None)]
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

    /// Skip link discovery and only process the existing link log
    #[arg(long, conflicts_with = "force_discovery")]
    resume: bool,

    /// Run link discovery even if a link log already exists
    #[arg(long, conflicts_with = "resume")]
    force_discovery: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show checkpoint progress and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let options = HarvestOptions {
        resume: cli.resume,
        force_discovery: cli.force_discovery,
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, options)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(&config, options).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("solution_spider=info,warn"),
            1 => EnvFilter::new("solution_spider=debug,info"),
            2 => EnvFilter::new("solution_spider=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, options: HarvestOptions) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Solution-Spider Dry Run ===\n");

    println!("Target:");
    println!("  Site: {}", config.target.site_root());
    println!("  Problem: {}", config.target.problem_id);
    println!("  Category: {}", config.target.category);
    println!("  Listing: {}", config.target.listing_url()?);

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Timeouts: navigation {}ms, selector {}ms",
        config.crawler.navigation_timeout, config.crawler.selector_timeout
    );
    println!(
        "  Page delay: {}ms + up to {}ms",
        config.crawler.page_delay, config.crawler.page_jitter
    );
    println!(
        "  Item delay: {}ms + up to {}ms",
        config.crawler.item_delay, config.crawler.item_jitter
    );

    println!("\nClient:");
    println!("  User agent: {}", config.client.user_agent);
    println!("  Accept-Language: {}", config.client.accept_language);
    match &config.client.session_cookie_env {
        Some(var) => println!("  Session cookie from: ${}", var),
        None => println!("  Session cookie: none"),
    }

    println!("\nState:");
    println!("  Directory: {}", config.state.directory.display());
    println!("  Backend: {:?}", config.state.backend);

    println!("\nOutput:");
    println!(
        "  Solutions: {}",
        config
            .output
            .solutions_directory
            .join(&config.target.problem_id)
            .display()
    );

    let log = LinkLog::in_dir(&config.state.directory);
    println!("\n✓ Configuration is valid");
    if should_discover(options, log.exists()) {
        println!("✓ Would discover links, then process them");
    } else {
        println!("✓ Would skip discovery and process {}", log.path().display());
    }

    Ok(())
}

/// Handles the --stats mode: shows checkpoint progress
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use solution_spider::output::{load_status, print_status};

    println!("State: {}\n", config.state.directory.display());

    // Open the checkpoint store
    let store = open_store(&config.state).with_context(|| {
        format!(
            "Failed to open checkpoints in {}",
            config.state.directory.display()
        )
    })?;
    let log = LinkLog::in_dir(&config.state.directory);

    let status = load_status(store.as_ref(), &log, &config.target.listing_url()?)?;
    print_status(&status);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    options: HarvestOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if options.resume {
        tracing::info!("Resuming: link discovery will be skipped");
    } else if options.force_discovery {
        tracing::info!("Forcing link discovery from the page checkpoint");
    }

    tracing::info!(
        "Harvesting {} submissions for {} (max {} pages)",
        config.target.language,
        config.target.problem_id,
        config.crawler.max_pages
    );

    match harvest(config, options).await {
        Ok(report) => {
            if let Some(discovery) = &report.discovery {
                tracing::info!(
                    "Discovered {} links on {} pages",
                    discovery.links.len(),
                    discovery.pages_fetched
                );
            }
            tracing::info!(
                "Harvest completed: {} stored, {} skipped of {} logged",
                report.processing.processed,
                report.processing.skipped,
                report.processing.total
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
