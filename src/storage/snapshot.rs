//! Snapshot Files
//!
//! A snapshot is a full copy of one of the store's maps, written wholesale to
//! a JSON file and replacing whatever was there before. The store keeps two of
//! them side by side: one for values and one for timestamp pairs.
//!
//! ## Format
//!
//! Each file holds one compact JSON object followed by a newline:
//!
//! ```text
//! data.json        {"name":"Ariz","lang":"rust"}
//! timestamps.json  {"name":{"CreatedAt":"2024-05-01T10:00:00.123456789Z","UpdatedAt":"..."}}
//! ```
//!
//! The reader takes one object per line and merges them in order, so later
//! lines override earlier keys. A line that does not decode is skipped and the
//! rest of the file is still read.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// File name of the value snapshot inside the data directory.
pub const DATA_FILE: &str = "data.json";

/// File name of the timestamp snapshot inside the data directory.
pub const TIMESTAMPS_FILE: &str = "timestamps.json";

/// Locations of the two snapshot files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    /// Value map snapshot (key -> value)
    pub data: PathBuf,
    /// Timestamp map snapshot (key -> {CreatedAt, UpdatedAt})
    pub timestamps: PathBuf,
}

impl SnapshotPaths {
    /// Explicit locations for the value and timestamp snapshots.
    pub fn new(data: impl Into<PathBuf>, timestamps: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            timestamps: timestamps.into(),
        }
    }

    /// Standard layout: `data.json` and `timestamps.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DATA_FILE), dir.join(TIMESTAMPS_FILE))
    }

    /// Creates the parent directories of both files if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for path in [&self.data, &self.timestamps] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
            }
        }
        Ok(())
    }
}

/// The outcome of reading one snapshot file.
#[derive(Debug)]
pub struct Decoded<T> {
    /// Everything that decoded cleanly
    pub map: HashMap<String, T>,
    /// Whether the file existed at all
    pub found: bool,
    /// Number of lines merged into `map`
    pub documents: usize,
    /// Number of malformed lines that were skipped
    pub skipped: usize,
}

impl<T> Decoded<T> {
    fn missing() -> Self {
        Self {
            map: HashMap::new(),
            found: false,
            documents: 0,
            skipped: 0,
        }
    }
}

/// Reads a snapshot file.
///
/// A missing file is an empty map, not an error. Each non-blank line is
/// decoded as one JSON object and merged in order; a malformed line is logged
/// and skipped, and reading carries on with the next one. Only real I/O
/// failures (e.g. permission denied) are returned as errors.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Decoded<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!(path = %path.display(), "no snapshot file");
            return Ok(Decoded::missing());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let mut decoded = Decoded {
        found: true,
        ..Decoded::missing()
    };

    // Split on raw bytes so a line with invalid UTF-8 is skipped like any
    // other malformed line.
    for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<HashMap<String, T>>(&line) {
            Ok(document) => {
                decoded.documents += 1;
                decoded.map.extend(document);
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping malformed snapshot line"
                );
                decoded.skipped += 1;
            }
        }
    }

    Ok(decoded)
}

/// Writes `map` to `path`, replacing the file's previous contents.
///
/// The file is created (or truncated), written through a buffer and flushed.
/// It is closed when the writer drops, on success and error paths alike.
pub fn write_snapshot<T: Serialize>(path: &Path, map: &HashMap<String, T>) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, map).map_err(|source| {
        if source.is_io() {
            Error::io(path, source.into())
        } else {
            Error::Encode {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    writer.write_all(b"\n").map_err(|e| Error::io(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))?;

    trace!(path = %path.display(), entries = map.len(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), "Ariz".to_string()),
            ("quote".to_string(), "say \"hi\"\nbye".to_string()),
            (String::new(), "empty key".to_string()),
        ])
    }

    #[test]
    fn test_in_dir_layout() {
        let paths = SnapshotPaths::in_dir("data");
        assert_eq!(paths.data, Path::new("data").join("data.json"));
        assert_eq!(paths.timestamps, Path::new("data").join("timestamps.json"));
    }

    #[test]
    fn test_ensure_dirs_creates_parents() {
        let dir = TempDir::new().unwrap();
        let paths = SnapshotPaths::in_dir(dir.path().join("nested").join("data"));

        paths.ensure_dirs().unwrap();
        assert!(dir.path().join("nested").join("data").is_dir());

        // Idempotent
        paths.ensure_dirs().unwrap();
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        write_snapshot(&path, &sample()).unwrap();
        let decoded = read_snapshot::<String>(&path).unwrap();

        assert!(decoded.found);
        assert_eq!(decoded.skipped, 0);
        assert_eq!(decoded.documents, 1);
        assert_eq!(decoded.map, sample());
    }

    #[test]
    fn test_written_file_is_one_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        write_snapshot(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        write_snapshot(&path, &sample()).unwrap();
        let smaller = HashMap::from([("k".to_string(), "v".to_string())]);
        write_snapshot(&path, &smaller).unwrap();

        let decoded = read_snapshot::<String>(&path).unwrap();
        assert_eq!(decoded.map, smaller);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let decoded = read_snapshot::<String>(&dir.path().join("absent.json")).unwrap();

        assert!(!decoded.found);
        assert!(decoded.map.is_empty());
    }

    #[test]
    fn test_read_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "").unwrap();

        let decoded = read_snapshot::<String>(&path).unwrap();
        assert!(decoded.found);
        assert_eq!(decoded.skipped, 0);
        assert!(decoded.map.is_empty());
    }

    #[test]
    fn test_read_merges_documents_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{\"a\":\"1\",\"b\":\"1\"}\n{\"b\":\"2\"}\n").unwrap();

        let decoded = read_snapshot::<String>(&path).unwrap();
        assert_eq!(decoded.documents, 2);
        assert_eq!(decoded.map.get("a").map(String::as_str), Some("1"));
        assert_eq!(decoded.map.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{\"a\":\"1\"}\nnot json at all\n{\"b\":\"2\"}\n").unwrap();

        let decoded = read_snapshot::<String>(&path).unwrap();
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.documents, 2);
        assert_eq!(decoded.map.get("a").map(String::as_str), Some("1"));
        assert_eq!(decoded.map.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_read_skips_invalid_utf8_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let mut contents = b"{\"a\":\"1\"}\n".to_vec();
        contents.extend_from_slice(&[0xff, 0xfe, b'\n']);
        contents.extend_from_slice(b"\n{\"b\":\"2\"}");
        fs::write(&path, contents).unwrap();

        let decoded = read_snapshot::<String>(&path).unwrap();
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.map.len(), 2);
    }

    #[test]
    fn test_read_wrong_shape_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let decoded = read_snapshot::<String>(&path).unwrap();
        assert_eq!(decoded.skipped, 1);
        assert!(decoded.map.is_empty());
    }

    #[test]
    fn test_read_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::create_dir(&path).unwrap();

        let err = read_snapshot::<String>(&path).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("data.json");

        let err = write_snapshot(&path, &sample()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
