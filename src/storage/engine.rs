//! Thread-Safe Store with Timestamps and Snapshots
//!
//! This module implements the core of kvdb: a string-to-string map plus a
//! parallel map of creation/update timestamps, both guarded by a single
//! `RwLock`, with explicit load and persist operations against a pair of
//! snapshot files.
//!
//! ## Design Decisions
//!
//! 1. **One lock, two maps**: Values and timestamps live in one `Tables`
//!    struct behind one `RwLock`, so no reader can see a key in one map and
//!    not the other.
//! 2. **Explicit durability**: Mutations only touch memory. The caller decides
//!    when to call [`Store::persist`], which rewrites both snapshot files.
//! 3. **Forgiving load**: Missing or malformed snapshots never abort startup.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                     Store                      │
//! │  ┌──────────────────────────────────────────┐  │
//! │  │              RwLock<Tables>              │  │
//! │  │  data:       HashMap<String, String>     │  │
//! │  │  timestamps: HashMap<String, Timestamps> │  │
//! │  └──────────────────────────────────────────┘  │
//! │         write: set / delete / load             │
//! │         read:  get / timestamps / persist      │
//! └────────────────────────────────────────────────┘
//! ```

use crate::error::{Error, Result};
use crate::storage::snapshot::{read_snapshot, write_snapshot, Decoded, SnapshotPaths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Creation and last-update instants of a key.
///
/// Serialized as `{"CreatedAt": ..., "UpdatedAt": ...}` with RFC 3339 strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Timestamps {
    /// Set once when the key is first created
    pub created_at: DateTime<Utc>,
    /// Refreshed on every set
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// A fresh pair for a key created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Records an update at `now`. `updated_at` never moves backwards, even
    /// if the wall clock does.
    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// What a [`Store::load`] call found on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of entries in the store after loading
    pub entries: usize,
    /// Snapshot files that did not exist
    pub missing_files: usize,
    /// Snapshot files that existed but could not be read; loaded as empty
    pub unreadable_files: usize,
    /// JSON lines merged across both files
    pub documents: usize,
    /// Malformed lines skipped across both files
    pub skipped_lines: usize,
    /// Entries that had a value but no timestamps and were given fresh ones
    pub restored_timestamps: usize,
    /// Timestamp pairs without a value that were discarded
    pub dropped_timestamps: usize,
}

impl LoadReport {
    /// Folds one file's outcome into the report and returns its map.
    fn absorb<T>(&mut self, path: &Path, outcome: Result<Decoded<T>>) -> HashMap<String, T> {
        match outcome {
            Ok(decoded) => {
                if !decoded.found {
                    self.missing_files += 1;
                }
                self.documents += decoded.documents;
                self.skipped_lines += decoded.skipped;
                decoded.map
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable snapshot, loading it as empty"
                );
                self.unreadable_files += 1;
                HashMap::new()
            }
        }
    }
}

/// The two maps, always mutated together under the write lock.
#[derive(Debug, Default)]
struct Tables {
    data: HashMap<String, String>,
    timestamps: HashMap<String, Timestamps>,
}

impl Tables {
    /// Makes the timestamp key set match the data key set.
    ///
    /// Returns `(restored, dropped)`.
    fn reconcile(&mut self, now: DateTime<Utc>) -> (usize, usize) {
        let Tables { data, timestamps } = self;

        let before = timestamps.len();
        timestamps.retain(|key, _| data.contains_key(key));
        let dropped = before - timestamps.len();

        let mut restored = 0;
        for key in data.keys() {
            if !timestamps.contains_key(key) {
                timestamps.insert(key.clone(), Timestamps::new(now));
                restored += 1;
            }
        }

        (restored, dropped)
    }
}

/// The kvdb store.
///
/// Holds every key, its value and its timestamps in memory, and knows where
/// its snapshot files live. Share it across threads with an `Arc`; all
/// operations take `&self`.
///
/// # Example
///
/// ```
/// use kvdb::storage::{SnapshotPaths, Store};
///
/// let store = Store::new(SnapshotPaths::in_dir("data"));
///
/// store.set("name", "Ariz").unwrap();
/// assert_eq!(store.get("name").unwrap(), "Ariz");
///
/// let ts = store.timestamps("name").unwrap();
/// assert_eq!(ts.created_at, ts.updated_at);
///
/// store.delete("name").unwrap();
/// assert!(store.get("name").unwrap_err().is_not_found());
/// ```
pub struct Store {
    tables: RwLock<Tables>,
    paths: SnapshotPaths,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.len())
            .field("data", &self.paths.data)
            .field("timestamps", &self.paths.timestamps)
            .finish()
    }
}

impl Store {
    /// Creates an empty store bound to `paths` without touching the disk.
    pub fn new(paths: SnapshotPaths) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            paths,
        }
    }

    /// Opens the store at `paths`: creates the snapshot directory if needed
    /// and loads whatever snapshots are there.
    ///
    /// Never fails. Any problem reading the snapshots is logged and the store
    /// starts with whatever could be loaded, possibly nothing.
    pub fn open(paths: SnapshotPaths) -> Self {
        if let Err(e) = paths.ensure_dirs() {
            warn!(error = %e, "could not create snapshot directory");
        }

        let store = Self::new(paths);
        let report = store.load();
        info!(
            entries = report.entries,
            missing = report.missing_files,
            unreadable = report.unreadable_files,
            documents = report.documents,
            skipped = report.skipped_lines,
            restored = report.restored_timestamps,
            dropped = report.dropped_timestamps,
            "store loaded"
        );
        store
    }

    /// The snapshot files this store loads from and persists to.
    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }

    // Every critical section leaves both maps consistent before anything that
    // can panic, so a poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets `key` to `value`.
    ///
    /// A new key gets `created_at = updated_at = now`. An existing key keeps
    /// its `created_at` and has `updated_at` refreshed.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        let now = Utc::now();

        let mut tables = self.write();
        let is_new = tables.data.insert(key.clone(), value).is_none();
        tables
            .timestamps
            .entry(key.clone())
            .and_modify(|ts| ts.touch(now))
            .or_insert_with(|| Timestamps::new(now));

        debug!(key = %key, is_new, "set");
        Ok(())
    }

    /// Gets the value of `key`.
    pub fn get(&self, key: &str) -> Result<String> {
        self.read().data.get(key).cloned().ok_or(Error::NotFound)
    }

    /// Deletes `key` and its timestamps.
    ///
    /// Fails with [`Error::NotFound`] if the key is absent, leaving the store
    /// unchanged.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut tables = self.write();
        if tables.data.remove(key).is_none() {
            return Err(Error::NotFound);
        }
        tables.timestamps.remove(key);

        debug!(key = %key, "delete");
        Ok(())
    }

    /// Gets the creation and last-update instants of `key`.
    pub fn timestamps(&self, key: &str) -> Result<Timestamps> {
        self.read().timestamps.get(key).copied().ok_or(Error::NotFound)
    }

    /// Returns `true` if `key` has an entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().data.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().data.len()
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces both maps with the contents of the snapshot files.
    ///
    /// Each file is read on its own. A missing or unreadable file loads as an
    /// empty map and malformed lines are skipped (see
    /// [`read_snapshot`](crate::storage::snapshot::read_snapshot)), so a
    /// failure on one file never discards what was read from the other. The
    /// two maps are then reconciled so every value has timestamps and vice
    /// versa.
    pub fn load(&self) -> LoadReport {
        let mut tables = self.write();
        let mut report = LoadReport::default();

        let data = read_snapshot::<String>(&self.paths.data);
        tables.data = report.absorb(&self.paths.data, data);
        let timestamps = read_snapshot::<Timestamps>(&self.paths.timestamps);
        tables.timestamps = report.absorb(&self.paths.timestamps, timestamps);

        let (restored, dropped) = tables.reconcile(Utc::now());
        if restored > 0 {
            warn!(count = restored, "entries without timestamps, assigned fresh ones");
        }
        if dropped > 0 {
            warn!(count = dropped, "timestamps without entries, discarded");
        }

        report.entries = tables.data.len();
        report.restored_timestamps = restored;
        report.dropped_timestamps = dropped;
        report
    }

    /// Writes both maps to their snapshot files, replacing previous contents.
    ///
    /// Holds the read lock for the whole dump: readers proceed, writers wait.
    /// A failure leaves memory untouched, so memory and disk may differ until
    /// the next successful persist.
    pub fn persist(&self) -> Result<()> {
        // Concurrent persists see the same maps through their read guards and
        // therefore write identical bytes.
        let tables = self.read();
        write_snapshot(&self.paths.data, &tables.data)?;
        write_snapshot(&self.paths.timestamps, &tables.timestamps)?;

        debug!(entries = tables.data.len(), "persisted");
        Ok(())
    }

    /// Persists one last time and drops the store.
    pub fn close(self) -> Result<()> {
        self.persist()?;
        info!(entries = self.len(), "store closed");
        Ok(())
    }
}
