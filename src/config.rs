//! Command-line configuration.
//!
//! ```text
//! kvdb [--data-dir <DIR>] [--log-level <LEVEL>] <COMMAND>
//!
//!   set <key> <value>   Set a key-value pair
//!   get <key>           Get the value for a key
//!   del <key>           Delete a key
//!   ts <key>            Get timestamps for a key
//! ```

use crate::storage::SnapshotPaths;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug, Clone)]
#[command(name = "kvdb", version, about = "An embedded key-value store with per-key timestamps")]
pub struct Config {
    /// Directory holding data.json and timestamps.json.
    #[arg(long, value_name = "DIR", default_value = crate::DEFAULT_DATA_DIR, global = true)]
    pub data_dir: PathBuf,

    /// Log filter for diagnostics on stderr (e.g. "warn", "kvdb=debug").
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Selected subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a key-value pair
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Get the value for a key
    Get { key: String },
    /// Delete a key
    Del { key: String },
    /// Get timestamps for a key
    Ts { key: String },
}

impl Command {
    /// Whether the command changes the store and must be persisted afterwards.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Command::Set { .. } | Command::Del { .. })
    }
}

impl Config {
    /// Snapshot file locations inside the data directory.
    pub fn snapshot_paths(&self) -> SnapshotPaths {
        SnapshotPaths::in_dir(&self.data_dir)
    }
}
