//! Skillgate CLI entry point.

use clap::Parser;
use skillgate::cli::{self, Cli, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr and stay silent unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "skillgate starting");

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
