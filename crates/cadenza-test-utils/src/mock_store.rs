// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory snapshot store.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadenza_core::traits::adapter::PluginAdapter;
use cadenza_core::traits::storage::SnapshotStore;
use cadenza_core::types::{AdapterType, CodeSnapshot, HealthStatus, SessionId};
use cadenza_core::CadenzaError;

/// Keeps snapshots in a map keyed by `(session, sequence)`.
///
/// Paths returned are synthetic (`memory/<session>/code_NNN.pi`) and never
/// touch the filesystem.
pub struct MemorySnapshotStore {
    snapshots: Mutex<BTreeMap<(String, u32), String>>,
    archived: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(BTreeMap::new()),
            archived: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// When set, `write` and `archive` fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn snapshot(&self, session_id: &SessionId, sequence: u32) -> Option<String> {
        self.snapshots
            .lock()
            .await
            .get(&(session_id.0.clone(), sequence))
            .cloned()
    }

    pub async fn snapshot_count(&self, session_id: &SessionId) -> usize {
        self.snapshots
            .lock()
            .await
            .keys()
            .filter(|(id, _)| id == session_id.as_str())
            .count()
    }

    /// Code passed to `archive`, oldest first.
    pub async fn archived(&self) -> Vec<String> {
        self.archived.lock().await.clone()
    }

    fn check_writable(&self) -> Result<(), CadenzaError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CadenzaError::Storage {
                message: "failed to write snapshot".into(),
                source: Box::new(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")),
            });
        }
        Ok(())
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemorySnapshotStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CadenzaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CadenzaError> {
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    fn session_location(&self, session_id: &SessionId) -> PathBuf {
        PathBuf::from("memory").join(session_id.as_str())
    }

    async fn open_session(&self, session_id: &SessionId) -> Result<PathBuf, CadenzaError> {
        Ok(self.session_location(session_id))
    }

    async fn write(&self, snapshot: &CodeSnapshot) -> Result<PathBuf, CadenzaError> {
        self.check_writable()?;
        self.snapshots.lock().await.insert(
            (snapshot.session_id.0.clone(), snapshot.sequence),
            snapshot.code.clone(),
        );
        Ok(self
            .session_location(&snapshot.session_id)
            .join(format!("code_{:03}.pi", snapshot.sequence)))
    }

    async fn read(&self, session_id: &SessionId, sequence: u32) -> Result<String, CadenzaError> {
        self.snapshot(session_id, sequence)
            .await
            .ok_or_else(|| CadenzaError::Storage {
                message: format!("snapshot {sequence} of {session_id} not found"),
                source: Box::new(io::Error::from(io::ErrorKind::NotFound)),
            })
    }

    async fn delete(&self, session_id: &SessionId, sequence: u32) -> Result<(), CadenzaError> {
        self.snapshots
            .lock()
            .await
            .remove(&(session_id.0.clone(), sequence));
        Ok(())
    }

    async fn archive(&self, code: &str) -> Result<PathBuf, CadenzaError> {
        self.check_writable()?;
        let mut archived = self.archived.lock().await;
        archived.push(code.to_string());
        Ok(PathBuf::from("memory/saved").join(format!("{}.pi", archived.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete() {
        let store = MemorySnapshotStore::new();
        let id = SessionId("session_test".into());

        let path = store
            .write(&CodeSnapshot {
                session_id: id.clone(),
                sequence: 1,
                code: "play 60".into(),
            })
            .await
            .unwrap();
        assert!(path.ends_with("code_001.pi"));
        assert_eq!(store.read(&id, 1).await.unwrap(), "play 60");

        store.delete(&id, 1).await.unwrap();
        assert!(store.read(&id, 1).await.is_err());
    }

    #[tokio::test]
    async fn scripted_write_failure() {
        let store = MemorySnapshotStore::new();
        store.set_fail_writes(true);
        let err = store
            .write(&CodeSnapshot {
                session_id: SessionId("s".into()),
                sequence: 1,
                code: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CadenzaError::Storage { .. }));
    }
}
