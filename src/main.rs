//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the incremental book-list
//! harvester. Every flag maps 1:1 to a field of the harvest configuration.

use clap::Parser;
use shelf_harvest::config::{validate, HarvestConfig};
use shelf_harvest::harvest::run_harvest;
use shelf_harvest::output::print_summary;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: a polite book-list harvester
///
/// Walks a paginated catalogue list page by page, downloads a bounded
/// number of cover images per page, and merges everything into a durable
/// CSV dataset. Re-running the same command resumes past the pages already
/// persisted; Ctrl-C saves progress before exiting.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite book-list harvester", long_about = None)]
struct Cli {
    /// Identifier of the list to harvest
    #[arg(long, default_value = "1.Best_Books_Ever")]
    list_id: String,

    /// First page to request
    #[arg(long, default_value_t = 1)]
    start_page: u32,

    /// Last page to request (inclusive)
    #[arg(long, default_value_t = 50)]
    end_page: u32,

    /// Disable cover downloads
    #[arg(long)]
    no_covers: bool,

    /// Maximum cover downloads per page
    #[arg(long, default_value_t = 3)]
    max_covers_per_page: u32,

    /// Seconds to wait between listing pages
    #[arg(long, default_value_t = 15)]
    delay_pages: u64,

    /// Base seconds to wait between cover downloads
    #[arg(long, default_value_t = 2)]
    delay_covers: u64,

    /// Output CSV path (derived from the list id when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory to store cover images in
    #[arg(long, default_value = "covers")]
    covers_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = config_from_cli(&cli);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    println!("Starting harvest... (press Ctrl-C to interrupt and save)");

    // The token is the interrupt handler's handle into the run: the loop
    // observes it at page boundaries and during delays, then flushes.
    let cancel = CancellationToken::new();
    let interrupt_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nInterrupt received; saving collected data...");
            interrupt_token.cancel();
        }
    });

    match run_harvest(config, cancel).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
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

/// Builds the harvest configuration from parsed CLI flags
fn config_from_cli(cli: &Cli) -> HarvestConfig {
    HarvestConfig {
        list_id: cli.list_id.clone(),
        start_page: cli.start_page,
        end_page: cli.end_page,
        download_covers: !cli.no_covers,
        max_covers_per_page: cli.max_covers_per_page,
        delay_between_pages_secs: cli.delay_pages,
        delay_between_covers_secs: cli.delay_covers,
        covers_dir: cli.covers_dir.clone(),
        output_file: cli.output.clone(),
        ..HarvestConfig::default()
    }
}
