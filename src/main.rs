//! Tidewalk main entry point
//!
//! Standalone command-line front end for the crawl engine: loads a TOML
//! configuration, wires the default sinks, and runs one crawl session.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tidewalk::config::load_config_with_hash;
use tidewalk::output::{JsonLinesSink, LogFailureSink, LogStatsSink};
use tidewalk::remote::StaticToken;
use tidewalk::session::CrawlSession;
use tracing_subscriber::EnvFilter;

/// Tidewalk: a directory crawl engine for multi-tenant content services
#[derive(Parser, Debug)]
#[command(name = "tidewalk")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a content directory and emit role-annotated documents", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let credentials = Arc::new(
        StaticToken::from_config(config.credentials.bearer_token.as_deref())
            .context("no usable credential")?,
    );
    let documents = Arc::new(
        JsonLinesSink::create(std::path::Path::new(&config.output.documents_path))
            .context("failed to open document output")?,
    );

    let mut session = CrawlSession::new(
        config,
        credentials,
        documents,
        Arc::new(LogFailureSink),
        Arc::new(LogStatsSink),
    )?;

    match session.run().await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidewalk=info,warn"),
            1 => EnvFilter::new("tidewalk=debug,info"),
            2 => EnvFilter::new("tidewalk=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &tidewalk::config::Config) {
    println!("=== Tidewalk Dry Run ===\n");

    println!("Crawl:");
    println!("  Worker threads: {}", config.crawl.number_of_threads);
    println!("  Ignore item errors: {}", config.crawl.ignore_error);
    println!("  Default roles: {:?}", config.crawl.default_roles());
    println!(
        "  Shutdown timeout: {}s",
        config.crawl.shutdown_timeout_secs
    );

    println!("\nIdentity:");
    println!("  Cache size: {}", config.identity.cache_size);

    println!("\nRetry:");
    println!(
        "  Wait window: {}ms - {}ms (default {}ms)",
        config.retry.min_wait_ms, config.retry.max_wait_ms, config.retry.default_wait_ms
    );

    println!("\nRemote:");
    println!("  Base URL: {}", config.remote.base_url);
    println!(
        "  User agent: {}/{}",
        config.remote.crawler_name, config.remote.crawler_version
    );

    println!("\nOutput:");
    println!("  Documents: {}", config.output.documents_path);

    println!("\n✓ Configuration is valid");
}
