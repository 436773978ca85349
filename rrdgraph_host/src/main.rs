//! # rrdgraph
//!
//! CLI for compiling graph requests and optionally rendering them

use clap::Parser;
use rrdgraph_compiler::{logging, pipeline};
use rrdgraph_host::cli::{self, Cli};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize global logging system
    logging::init_global_logging()?;

    // Validate compiler configuration
    pipeline::validate_pipeline()?;

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}
