//! # Snapshot Store
//!
//! Single-slot durable storage for the opaque snapshot blob. There is no
//! history and no versioning: each successful capture replaces the prior
//! one unconditionally, and a restart resumes from whatever the slot holds.
//!
//! Two implementations ship with the crate: a file-backed slot matching the
//! original single-file layout, and an in-memory slot for tests and
//! embedding.

use crate::error::{Result, SnapguardError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Durable single-slot storage for snapshot bytes.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Overwrite the slot with the given bytes.
    async fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Read the slot. `Ok(None)` means no usable snapshot exists, which is
    /// not an error.
    async fn read(&self) -> Result<Option<Vec<u8>>>;
}

/// File-backed snapshot slot.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write can never leave a truncated snapshot in the slot.
pub struct FileSnapshotStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        Self { path, temp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn write(&self, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(&self.temp_path, bytes)
            .await
            .map_err(|e| SnapguardError::StoreWrite {
                message: format!("{}: {e}", self.temp_path.display()),
            })?;
        tokio::fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(|e| SnapguardError::StoreWrite {
                message: format!("{}: {e}", self.path.display()),
            })?;

        debug!(
            path = %self.path.display(),
            size_bytes = bytes.len(),
            "Snapshot slot overwritten"
        );
        Ok(())
    }

    async fn read(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            // An empty file carries no usable state either
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapguardError::StoreRead {
                message: format!("{}: {e}", self.path.display()),
            }),
        }
    }
}

/// In-memory snapshot slot for tests and embedded use.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<Vec<u8>>>,
    write_count: Mutex<u64>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the slot, as if a prior run had persisted a snapshot.
    pub fn with_snapshot(bytes: Vec<u8>) -> Self {
        Self {
            slot: Mutex::new(Some(bytes)),
            write_count: Mutex::new(0),
        }
    }

    /// Contents of the slot right now.
    pub fn current(&self) -> Option<Vec<u8>> {
        self.slot.lock().unwrap().clone()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> u64 {
        *self.write_count.lock().unwrap()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn write(&self, bytes: &[u8]) -> Result<()> {
        *self.slot.lock().unwrap() = Some(bytes.to_vec());
        *self.write_count.lock().unwrap() += 1;
        Ok(())
    }

    async fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("chain_state.bin"));

        assert!(store.read().await.unwrap().is_none());

        store.write(b"state-a").await.unwrap();
        assert_eq!(store.read().await.unwrap().unwrap(), b"state-a");

        store.write(b"state-b").await.unwrap();
        assert_eq!(store.read().await.unwrap().unwrap(), b"state-b");
    }

    #[tokio::test]
    async fn file_store_treats_empty_file_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain_state.bin");
        tokio::fs::write(&path, b"").await.unwrap();

        let store = FileSnapshotStore::new(&path);
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("chain_state.bin"));
        store.write(b"state").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("chain_state.bin")]);
    }

    #[tokio::test]
    async fn memory_store_tracks_writes() {
        let store = MemorySnapshotStore::new();
        assert!(store.read().await.unwrap().is_none());

        store.write(b"one").await.unwrap();
        store.write(b"two").await.unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.current().unwrap(), b"two");
    }

    #[tokio::test]
    async fn preseeded_memory_store_reads_back() {
        let store = MemorySnapshotStore::with_snapshot(b"prior".to_vec());
        assert_eq!(store.read().await.unwrap().unwrap(), b"prior");
        assert_eq!(store.write_count(), 0);
    }
}
