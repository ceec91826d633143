//! kvdb - An Embedded Key-Value Store
//!
//! This is the main entry point for the kvdb command-line tool.
//! It loads the store, runs one command and prints the result.

use anyhow::Context;
use clap::Parser;
use kvdb::{CommandHandler, Config, Store};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Sets up logging on stderr so stdout carries only command output.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::parse();

    init_logging(&config.log_level);
    debug!(version = kvdb::VERSION, data_dir = %config.data_dir.display(), "starting");

    // Load the store from its snapshots
    let store = Arc::new(Store::open(config.snapshot_paths()));
    let handler = CommandHandler::new(store);

    let reply = handler
        .execute(&config.command)
        .context("failed to persist store")?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", reply).context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")?;

    Ok(())
}
