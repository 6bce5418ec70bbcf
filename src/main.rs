//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog ETL pipeline.

use anyhow::Context;
use catalog_harvest::config::{hash_str, load_config_with_hash, validate, Config};
use catalog_harvest::crawler::harvest;
use catalog_harvest::output::{
    default_csv_name, print_statistics, write_all, CsvSink, HarvestStatistics, OutputFormat,
    ProductSink, SqliteSink,
};
use catalog_harvest::storage::{open_storage, RunStatus};
use catalog_harvest::transform::transform_products;
use catalog_harvest::SiteUrls;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status used when the user interrupts a harvest
const EXIT_INTERRUPTED: u8 = 130;

/// Catalog-Harvest: a polite paginated catalog scraper
///
/// Catalog-Harvest fetches every page of a product catalog under a
/// concurrency cap with jittered, backed-off retries, cleans the extracted
/// fields and writes the rows to CSV and/or SQLite.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite paginated catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Highest page number to request
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Pages fetched concurrently per batch
    #[arg(long, value_name = "N")]
    batch_size: Option<u32>,

    /// Output format: csv, sqlite or both
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// CSV output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

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

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
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
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, config_hash) = resolve_config(&cli)?;
    let format: OutputFormat = config
        .output
        .format
        .parse()
        .context("Unsupported output format")?;
    let site = SiteUrls::from_config(&config.site).context("Invalid site configuration")?;

    if cli.dry_run {
        handle_dry_run(&config, &site, format);
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(
        "Harvesting {} (up to {} pages, batches of {})",
        site.root(),
        config.harvester.max_pages,
        config.harvester.batch_size
    );

    let result = tokio::select! {
        result = harvest(&config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, aborting harvest");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };
    let harvested = match result {
        Ok(harvested) => harvested,
        Err(e) => {
            if e.is_timeout() && format.writes_sqlite() {
                record_timeout(&config, &config_hash);
            }
            return Err(anyhow::Error::new(e).context("Harvest failed"));
        }
    };

    let products = transform_products(&harvested.products, config.output.exchange_rate);
    tracing::info!(
        "Cleaned {} of {} scraped records",
        products.len(),
        harvested.products.len()
    );

    if products.is_empty() {
        tracing::error!("No products to save");
        print_statistics(&HarvestStatistics::from_report(&harvested.report, 0));
        return Ok(ExitCode::FAILURE);
    }

    let mut sinks = build_sinks(&config, format, &config_hash)?;
    write_all(&mut sinks, &products).context("Failed to write products")?;

    if !cli.quiet {
        print_statistics(&HarvestStatistics::from_report(
            &harvested.report,
            products.len(),
        ));
    }

    Ok(ExitCode::SUCCESS)
}

/// Loads the config file (if any), applies CLI overrides and re-validates
fn resolve_config(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        None => (Config::default(), hash_str("")),
    };

    if let Some(max_pages) = cli.max_pages {
        config.harvester.max_pages = max_pages;
    }
    if let Some(batch_size) = cli.batch_size {
        config.harvester.batch_size = batch_size;
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = Some(output.display().to_string());
    }
    if let Some(database) = &cli.database {
        config.output.database_path = database.display().to_string();
    }

    validate(&config).context("Invalid configuration")?;
    Ok((config, hash))
}

fn build_sinks(
    config: &Config,
    format: OutputFormat,
    config_hash: &str,
) -> anyhow::Result<Vec<Box<dyn ProductSink>>> {
    let mut sinks: Vec<Box<dyn ProductSink>> = Vec::new();

    if format.writes_csv() {
        let path = config
            .output
            .csv_path
            .clone()
            .unwrap_or_else(default_csv_name);
        sinks.push(Box::new(CsvSink::new(path)));
    }

    if format.writes_sqlite() {
        let path = Path::new(&config.output.database_path);
        let storage = open_storage(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        sinks.push(Box::new(SqliteSink::new(storage, config_hash)));
    }

    Ok(sinks)
}

/// Leaves a timed-out run in the database so aborted harvests stay visible
fn record_timeout(config: &Config, config_hash: &str) {
    let path = Path::new(&config.output.database_path);
    let recorded = open_storage(path)
        .map_err(|e| e.to_string())
        .and_then(|storage| {
            SqliteSink::new(storage, config_hash)
                .record_aborted(RunStatus::TimedOut)
                .map_err(|e| e.to_string())
        });

    if let Err(e) = recorded {
        tracing::warn!("Could not record timed-out run in {}: {}", path.display(), e);
    }
}

/// Handles the --dry-run mode: shows what would be fetched
fn handle_dry_run(config: &Config, site: &SiteUrls, format: OutputFormat) {
    let h = &config.harvester;

    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Harvester Configuration:");
    println!("  Concurrency limit: {}", h.concurrency_limit);
    println!("  Max retries: {}", h.max_retries);
    println!("  Jitter: {}-{}ms", h.jitter_min_ms, h.jitter_max_ms);
    println!("  Backoff unit: {}ms", h.backoff_unit_ms);
    println!(
        "  Batch pause: {}-{}ms",
        h.batch_pause_min_ms, h.batch_pause_max_ms
    );
    println!("  Session timeout: {}s", h.session_timeout_secs);
    println!("  Max pages: {}", h.max_pages);
    println!("  Batch size: {}", h.batch_size);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Format: {}", format);
    if format.writes_csv() {
        match &config.output.csv_path {
            Some(path) => println!("  CSV: {}", path),
            None => println!("  CSV: fashion_products_<timestamp>.csv"),
        }
    }
    if format.writes_sqlite() {
        println!("  Database: {}", config.output.database_path);
    }
    println!("  Exchange rate: {}", config.output.exchange_rate);

    let preview = h.batch_size.min(h.max_pages);
    println!("\nFirst batch ({} pages):", preview);
    for page in 1..=preview {
        println!("  - {}", site.page_url(page));
    }

    println!("\n✓ Configuration is valid");
}
