//! # kvdb - An Embedded Key-Value Store
//!
//! kvdb stores string values under string keys, remembers when each key was
//! created and last updated, and keeps everything on disk as two JSON snapshot
//! files. It is driven from the command line: every invocation loads the
//! snapshots, runs one command and, for mutations, writes the snapshots back.
//!
//! ## Features
//!
//! - **Timestamps**: every key carries a creation and a last-update instant
//! - **Thread Safe**: one `RwLock` guards values and timestamps together
//! - **Snapshots**: full JSON dumps, readable with any text editor
//! - **Forgiving Startup**: missing or damaged snapshots never stop the process
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                              kvdb                             │
//! │                                                               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐    │
//! │  │ clap Config │───>│  Command    │───>│      Store      │    │
//! │  │  (argv)     │    │  Handler    │    │ RwLock<Tables>  │    │
//! │  └─────────────┘    └─────────────┘    └────────┬────────┘    │
//! │                                                 │             │
//! │                                   load / persist│             │
//! │                                                 ▼             │
//! │                                    data/data.json             │
//! │                                    data/timestamps.json       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use kvdb::{CommandHandler, Command, SnapshotPaths, Store};
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::open(SnapshotPaths::in_dir("data")));
//! let handler = CommandHandler::new(Arc::clone(&store));
//!
//! let reply = handler
//!     .execute(&Command::Set { key: "name".into(), value: "Ariz".into() })
//!     .unwrap();
//! print!("{}", reply);
//! ```
//!
//! ## Commands
//!
//! - `kvdb set <key> <value>`
//! - `kvdb get <key>`
//! - `kvdb del <key>`
//! - `kvdb ts <key>`
//!
//! ## Module Overview
//!
//! - [`storage`]: the store and its snapshot files
//! - [`commands`]: runs CLI commands against the store
//! - [`config`]: command-line definition
//! - [`error`]: error type shared by all of the above

pub mod commands;
pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, Reply};
pub use config::{Command, Config};
pub use error::{Error, Result};
pub use storage::{LoadReport, SnapshotPaths, Store, Timestamps};

/// The default snapshot directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Version of kvdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
