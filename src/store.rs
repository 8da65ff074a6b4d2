use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SNAPSHOTS_DIR;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The shared data location could not be resolved. Distinct from "no
    /// snapshot written yet", which reads as `Ok(None)`.
    #[error("shared snapshot location unavailable")]
    StorageUnavailable,
    #[error("persisted snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Versioned JSON persistence of one snapshot type to the shared
/// `Snapshots/` directory.
///
/// Writes stage the full encoding to a sibling temp file and rename it into
/// place, so any number of readers polling `read_latest` observe either the
/// fully-previous or fully-new file, never a partial one. That atomic
/// replace is the only cross-process guarantee the producer/consumer split
/// needs; there are no locks.
pub struct SnapshotStore<T> {
    root: Option<PathBuf>,
    file_name: String,
    _snapshot: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> SnapshotStore<T> {
    /// `root` is the shared data directory; `None` when the platform
    /// location could not be resolved, which surfaces as
    /// [`StoreError::StorageUnavailable`] on first use rather than at
    /// construction.
    pub fn new(root: Option<PathBuf>, file_name: &str) -> Self {
        Self {
            root,
            file_name: file_name.to_string(),
            _snapshot: PhantomData,
        }
    }

    /// Resolves the snapshot path without touching the filesystem: readers
    /// of a never-written location must see "absent", not a freshly created
    /// directory (or a permission error creating one).
    fn snapshot_path(&self) -> Result<PathBuf, StoreError> {
        let root = self.root.as_ref().ok_or(StoreError::StorageUnavailable)?;
        Ok(root.join(SNAPSHOTS_DIR).join(&self.file_name))
    }

    /// Serializes and atomically replaces the persisted snapshot. Only the
    /// writer creates the `Snapshots/` directory.
    pub fn write(&self, snapshot: &T) -> Result<PathBuf, StoreError> {
        let root = self.root.as_ref().ok_or(StoreError::StorageUnavailable)?;
        let dir = root.join(SNAPSHOTS_DIR);
        fs::create_dir_all(&dir)?;
        let path = dir.join(&self.file_name);
        let staged = path.with_extension("json.tmp");

        let data = serde_json::to_vec_pretty(snapshot)?;
        let mut file = fs::File::create(&staged)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staged, &path)?;
        Ok(path)
    }

    /// Returns the most recently written snapshot, or `None` when nothing
    /// has been persisted yet. A present-but-undecodable file is
    /// [`StoreError::Corrupt`]; consumers treat both the same way, but the
    /// distinction matters for diagnostics.
    pub fn read_latest(&self) -> Result<Option<T>, StoreError> {
        let path = self.snapshot_path()?;
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Deletes the persisted snapshot, returning to the absent state.
    pub fn reset(&self) -> Result<(), StoreError> {
        let path = self.snapshot_path()?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
