//! Catalog-Sweep main entry point
//!
//! This is the command-line interface for the Catalog-Sweep product harvester.

use anyhow::Context;
use catalog_sweep::config::{load_config_with_hash, SweepConfig};
use catalog_sweep::harvest::{run_harvest, Paginator, Strategy};
use catalog_sweep::output::write_csv;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Sweep: a paginated product-listing harvester
///
/// Catalog-Sweep walks the result pages of a product search, extracts the
/// name, price, MPN and URL of every product and writes them to a CSV file.
/// Without a configuration file the built-in defaults are used.
#[derive(Parser, Debug)]
#[command(name = "catalog-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A paginated product-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// How pages are acquired (http or browser)
    #[arg(short, long, default_value = "http")]
    strategy: Strategy,

    /// CSV file to write (overrides the configured path)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            SweepConfig::default()
        }
    };

    let output_path = cli
        .output
        .clone()
        .or_else(|| config.output.csv_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(cli.strategy.default_output()));

    if cli.dry_run {
        handle_dry_run(&config, cli.strategy, &output_path)?;
    } else {
        handle_harvest(&config, cli.strategy, &output_path).await?;
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
            0 => EnvFilter::new("catalog_sweep=info,warn"),
            1 => EnvFilter::new("catalog_sweep=debug,info"),
            2 => EnvFilter::new("catalog_sweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(
    config: &SweepConfig,
    strategy: Strategy,
    output_path: &std::path::Path,
) -> anyhow::Result<()> {
    // Compiling the extractor is the last piece of validation a run performs
    let extractor = catalog_sweep::extract::Extractor::new(
        &config.target,
        &config.selectors,
        strategy.link_mode(),
    )?;
    let paginator = Paginator::new(config, extractor, strategy.stop_policy(&config.pagination));

    println!("=== Catalog-Sweep Dry Run ===\n");

    println!("Target:");
    println!("  Search URL: {}", config.target.search_url);
    println!("  Base URL: {}", config.target.base_url);
    println!("  Currency: {}", config.target.currency_symbol);

    println!("\nStrategy: {}", strategy);
    match strategy {
        Strategy::Http => {
            println!("  Timeout: {}s", config.http.timeout_secs);
            println!(
                "  Attempts: {} (base delay {}ms)",
                config.http.max_attempts, config.http.retry_delay_ms
            );
        }
        Strategy::Browser => {
            println!("  WebDriver: {}", config.browser.webdriver_url);
            println!("  Headless: {}", config.browser.headless);
            println!("  Render timeout: {}s", config.browser.render_timeout_secs);
        }
    }
    println!("  Stop policy: {:?}", paginator.policy());

    println!("\nPagination:");
    println!("  Page delay: {}ms", config.pagination.page_delay_ms);
    match config.pagination.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }

    println!("\nOutput:");
    println!("  CSV: {}", output_path.display());

    println!("\nFirst pages:");
    let preview = config.pagination.max_pages.unwrap_or(3).min(3);
    for page in 0..preview {
        println!("  {}. {}", page + 1, paginator.page_url(page));
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &SweepConfig,
    strategy: Strategy,
    output_path: &std::path::Path,
) -> anyhow::Result<()> {
    let harvest = match run_harvest(config, strategy).await {
        Ok(harvest) => harvest,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Scraped {} products", harvest.records.len());

    // A failed write is reported but does not fail the run
    match write_csv(&harvest.records, output_path) {
        Ok(()) => tracing::info!("Data saved to {}", output_path.display()),
        Err(e) => tracing::error!("Failed to write {}: {}", output_path.display(), e),
    }

    Ok(())
}
