//! Storage Module
//!
//! This module provides the core storage functionality for kvdb: an in-memory
//! store of string values with per-key timestamps, and the snapshot files that
//! make it durable across process restarts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                 Store                   │
//! │   RwLock<{ data, timestamps }>          │
//! └──────────────┬──────────────────────────┘
//!                │ load / persist
//!                ▼
//! ┌─────────────────────────────────────────┐
//! │          snapshot files                 │
//! │   data/data.json                        │
//! │   data/timestamps.json                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kvdb::storage::{SnapshotPaths, Store};
//!
//! let store = Store::open(SnapshotPaths::in_dir("data"));
//!
//! store.set("name", "Ariz").unwrap();
//! store.persist().unwrap();
//! ```

pub mod engine;
pub mod snapshot;

// Re-export commonly used types
pub use engine::{LoadReport, Store, Timestamps};
pub use snapshot::{SnapshotPaths, DATA_FILE, TIMESTAMPS_FILE};
