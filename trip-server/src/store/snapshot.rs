//! JSON snapshot files backing a collection.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// On-disk snapshot layout.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<T> {
    /// Unix timestamp when the snapshot was written.
    saved_at_secs: u64,
    /// Every record in the collection.
    records: Vec<T>,
}

/// A JSON file holding every record of one collection.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Snapshot stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file for `collection` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>, collection: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{collection}s.json")))
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the records, or `None` if no snapshot has been written yet.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };

        let snapshot: Snapshot<T> =
            serde_json::from_str(&contents).map_err(|e| StoreError::Format {
                message: format!("{}: {}", self.path.display(), e),
            })?;

        Ok(Some(snapshot.records))
    }

    /// Replace the snapshot with `records`.
    ///
    /// Writes to a sibling temp file and renames it over the snapshot, so a
    /// crash mid-write leaves the previous snapshot intact. Creates parent
    /// directories if they don't exist.
    pub fn save<'a, T, I>(&self, records: I) -> Result<(), StoreError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let saved_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let snapshot = Snapshot {
            saved_at_secs,
            records: records.into_iter().collect::<Vec<_>>(),
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Format {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Io {
            message: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io {
            message: format!("failed to replace {}: {}", self.path.display(), e),
        })?;

        Ok(())
    }
}
