//! Mapharvest main entry point
//!
//! This is the command-line interface for the mapharvest listing harvester.

use clap::Parser;
use mapharvest::browser::BrowserSession;
use mapharvest::config::load_config_with_hash;
use mapharvest::output::write_csv_file;
use mapharvest::pipeline::run_job;
use mapharvest::{JobContext, JobRequest, JobSlot, ScraperConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mapharvest: a map-search listing harvester
///
/// Mapharvest opens a map-search results page in a headless browser,
/// scrolls until the result list is exhausted, visits every business
/// detail page, and writes the harvested records to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "mapharvest")]
#[command(version = "1.0.0")]
#[command(about = "A map-search listing harvester", long_about = None)]
struct Cli {
    /// Map-search results URL to harvest
    #[arg(value_name = "URL")]
    target_url: String,

    /// Output file name (`.csv` is appended when missing)
    #[arg(short, long, default_value = "results")]
    output: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    with_head: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => ScraperConfig::default(),
    };

    if cli.with_head {
        config.browser.headless = false;
    }

    let request = JobRequest::new(cli.output, cli.target_url);
    if let Err(e) = request.validate() {
        tracing::error!("Invalid request: {}", e);
        return Err(e.into());
    }

    run_harvest(config, request).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mapharvest=info,warn"),
            1 => EnvFilter::new("mapharvest=debug,info"),
            2 => EnvFilter::new("mapharvest=trace,debug"),
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

/// Runs one harvest job end to end
async fn run_harvest(
    config: ScraperConfig,
    request: JobRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let slot = JobSlot::new();
    let _guard = slot.try_acquire()?;

    let ctx = JobContext::new();

    // Ctrl-C raises the cancellation flag; the scroll loop honors it at the
    // next iteration boundary
    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current scroll");
            cancel.cancel();
        }
    });

    // Mirror progress events to the log as they are published
    let mut progress_rx = ctx.progress.subscribe();
    let reporter = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let event = progress_rx.borrow().clone();
            if let Some(event) = event {
                match &event.message {
                    Some(message) => {
                        tracing::info!("[{:?}] {}% - {}", event.status, event.progress, message)
                    }
                    None => tracing::info!("[{:?}] {}%", event.status, event.progress),
                }
                if event.is_terminal() {
                    break;
                }
            }
        }
    });

    let session = BrowserSession::launch(&config.browser).await?;

    let result = run_job(&session, &config, &request, &ctx).await;

    // Close the browser before inspecting the result so Chrome never
    // outlives the process on error paths
    if let Err(e) = session.close().await {
        tracing::warn!("Browser shutdown error: {}", e);
    }
    reporter.abort();

    match result {
        Ok(outcome) => {
            let directory = PathBuf::from(&config.output.directory);
            let path = write_csv_file(&outcome.records, &directory, &request.output_name)?;
            tracing::info!(
                "Harvest completed: {} records ({} listings, {} scroll iterations) -> {}",
                outcome.records.len(),
                outcome.listing_count,
                outcome.scroll_iterations,
                path.display()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
