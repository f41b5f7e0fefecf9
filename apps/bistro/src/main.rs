//! # bistro - Point-of-Sale Client
//!
//! Binary entry point. Command parsing and execution live in the library
//! (`bistro::cli`) so integration tests can drive the same code.
//!
//! ## Usage
//!
//! ```bash
//! # Browse and order
//! bistro menu list --search burger
//! bistro cart add 12 --option 101 --quantity 2
//! bistro checkout --name "Ana" --phone 555-0101 --payment card
//!
//! # Staff
//! bistro login -e staff@bistro.test -p secret
//! bistro order status 42 7 cooking
//! bistro watch
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = bistro::cli::Cli::parse();

    init_tracing(cli.verbose);

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = bistro::cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output stays clean on stdout.
/// BISTRO_LOG_FORMAT=json enables machine-parseable output.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("BISTRO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_level = if verbose { "bistro=debug" } else { "bistro=info" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_banner() {
    println!("bistro v{} - point-of-sale client", env!("CARGO_PKG_VERSION"));
    println!();
}
