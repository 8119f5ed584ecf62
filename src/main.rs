//! Reactor Uploader CLI application
//!
//! Uploads an extension package zip to Reactor and waits for processing.

use std::process;

use colored::Colorize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use reactor_uploader::cli::{handle_upload, Cli};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(&cli);

    info!("Reactor Uploader v{} starting", env!("CARGO_PKG_VERSION"));

    let verbose = cli.is_verbose();
    if let Err(e) = handle_upload(cli).await {
        if verbose {
            eprintln!("{}", format!("{:?}", e).bold().red());
        } else {
            eprintln!("{}", e.to_string().bold().red());
        }
        tracing::debug!("Upload failed ({})", e.category());
        process::exit(1);
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    // Create environment filter
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("reactor_uploader={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.very_verbose) // Show levels only in very verbose mode
        .with_writer(std::io::stderr)
        .init();

    if cli.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.verbose {
        info!("Verbose logging enabled");
    }
}
