//! Error types for kvdb.
//!
//! There is exactly one domain error, [`Error::NotFound`]. Everything else is
//! a snapshot I/O or encoding failure, carrying the path that failed.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the store and the snapshot codec.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced key has no entry.
    #[error("key not found")]
    NotFound,

    /// A snapshot file could not be opened, created, read or written.
    #[error("snapshot I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot map could not be encoded as JSON.
    #[error("failed to encode snapshot {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` for the key-not-found domain error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
