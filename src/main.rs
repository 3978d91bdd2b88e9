//! Trust-Crawler main entry point
//!
//! This is the command-line interface for the Trust-Crawler batch crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use trust_crawler::config::{load_config_with_hash, Config};
use trust_crawler::crawler::{dedup_seeds, run_pipeline};
use trust_crawler::output::{print_statistics, reaggregate, CrawlStatistics};
use trust_crawler::seed::load_seeds;

/// Trust-Crawler: a budget-bounded, domain-scoped site crawler
///
/// Trust-Crawler fetches up to a fixed number of same-domain pages for each
/// organization in a seed list and consolidates them into a per-domain
/// path → body mapping with a separate error report.
#[derive(Parser, Debug)]
#[command(name = "trust-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A budget-bounded, domain-scoped site crawler", long_about = None)]
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

    /// Validate config and seeds and show what would be crawled without crawling
    #[arg(long, conflicts_with = "aggregate_only")]
    dry_run: bool,

    /// Re-aggregate an existing records file and rewrite the outputs
    #[arg(long, conflicts_with = "dry_run")]
    aggregate_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.aggregate_only {
        handle_aggregate_only(&config)
    } else {
        handle_crawl(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trust_crawler=info,warn"),
            1 => EnvFilter::new("trust_crawler=debug,info"),
            2 => EnvFilter::new("trust_crawler=trace,debug"),
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

/// Handles the --dry-run mode: validates config and seeds and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seeds = load_seeds(Path::new(&config.input.seeds_path))
        .with_context(|| format!("Failed to load seeds from {}", config.input.seeds_path))?;
    let total = seeds.len();
    let seeds = dedup_seeds(seeds);

    println!("=== Trust-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page limit per domain: {}", config.crawler.page_limit);
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
    println!(
        "  Retry: {} attempts, {}ms base backoff",
        config.crawler.max_fetch_attempts, config.crawler.backoff_ms
    );
    println!(
        "  Concurrency: {} fetches per domain, {} domains",
        config.crawler.max_concurrent_fetches, config.crawler.max_concurrent_domains
    );
    match config.crawler.domain_deadline() {
        Some(deadline) => println!("  Domain deadline: {}s", deadline.as_secs()),
        None => println!("  Domain deadline: none"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Consolidated: {}", config.output.consolidated_path);
    println!("  Errors: {}", config.output.errors_path);

    println!("\nSeeds ({} of {}):", seeds.len(), total);
    for seed in &seeds {
        println!("  - {}: {}", seed.name, seed.url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch at most {} pages",
        seeds.len() as u64 * u64::from(config.crawler.page_limit)
    );

    Ok(())
}

/// Handles the --aggregate-only mode: rebuilds outputs from an existing records file
fn handle_aggregate_only(config: &Config) -> anyhow::Result<()> {
    let (records, aggregate) = reaggregate(config).context("Aggregation failed")?;

    println!("✓ Consolidated output written to: {}", config.output.consolidated_path);
    println!("✓ Error report written to: {}\n", config.output.errors_path);
    print_statistics(&CrawlStatistics::from_run(&[], &records, &aggregate));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let (outcome, aggregate) = run_pipeline(config).await.context("Crawl failed")?;

    tracing::info!("Crawl completed successfully");
    print_statistics(&CrawlStatistics::from_run(
        &outcome.reports,
        &outcome.records,
        &aggregate,
    ));

    Ok(())
}
