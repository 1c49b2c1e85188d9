//! # FogBugz Import Entry Point
//!
//! Replays ticket CSV exports against the FogBugz XML API.

use anyhow::Result;
use clap::Parser;
use fogbugz_cli::cli::{Cli, handle_cli};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
  let cmd = Cli::parse();

  // Set up tracing based on verbosity level
  let level = match cmd.verbose {
    0 => tracing::Level::WARN,  // Default: warnings and errors
    1 => tracing::Level::INFO,  // -v: per-row and per-file progress
    2 => tracing::Level::DEBUG, // -vv: request and encoding detail
    _ => tracing::Level::TRACE, // -vvv or more: raw responses
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env().add_directive(level.into()))
    .init();

  debug!("Tracing initialized with level: {}", level);

  handle_cli(cmd)
}
