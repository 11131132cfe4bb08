// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem implementation of the SnapshotStore trait.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use cadenza_config::model::StorageConfig;
use cadenza_core::{
    AdapterType, CadenzaError, CodeSnapshot, HealthStatus, PluginAdapter, SessionId, SnapshotStore,
};

use crate::layout;

/// Stores each session's snapshots in its own directory.
///
/// Directories are created on demand, so a session whose directory could
/// not be prepared up front still recovers on its first write.
pub struct FileSnapshotStore {
    sessions_dir: PathBuf,
    saved_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            sessions_dir: PathBuf::from(&config.sessions_dir),
            saved_dir: PathBuf::from(&config.saved_dir),
        }
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    pub fn saved_dir(&self) -> &Path {
        &self.saved_dir
    }
}

fn storage_err(message: impl Into<String>, e: io::Error) -> CadenzaError {
    CadenzaError::Storage {
        message: message.into(),
        source: Box::new(e),
    }
}

#[async_trait]
impl PluginAdapter for FileSnapshotStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CadenzaError> {
        match tokio::fs::metadata(&self.sessions_dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.sessions_dir.display()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HealthStatus::Degraded(
                format!("{} does not exist yet", self.sessions_dir.display()),
            )),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), CadenzaError> {
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    fn session_location(&self, session_id: &SessionId) -> PathBuf {
        self.sessions_dir.join(session_id.as_str())
    }

    async fn open_session(&self, session_id: &SessionId) -> Result<PathBuf, CadenzaError> {
        let dir = self.session_location(session_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_err(format!("failed to create {}", dir.display()), e))?;
        debug!(dir = %dir.display(), "session directory ready");
        Ok(dir)
    }

    async fn write(&self, snapshot: &CodeSnapshot) -> Result<PathBuf, CadenzaError> {
        let dir = self.open_session(&snapshot.session_id).await?;
        let path = layout::snapshot_path(&dir, snapshot.sequence);
        tokio::fs::write(&path, &snapshot.code)
            .await
            .map_err(|e| storage_err(format!("failed to write {}", path.display()), e))?;
        debug!(path = %path.display(), bytes = snapshot.code.len(), "snapshot written");
        Ok(path)
    }

    async fn read(&self, session_id: &SessionId, sequence: u32) -> Result<String, CadenzaError> {
        let path = layout::snapshot_path(&self.session_location(session_id), sequence);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| storage_err(format!("failed to read {}", path.display()), e))
    }

    async fn delete(&self, session_id: &SessionId, sequence: u32) -> Result<(), CadenzaError> {
        let path = layout::snapshot_path(&self.session_location(session_id), sequence);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "snapshot already absent");
                Ok(())
            }
            Err(e) => Err(storage_err(format!("failed to delete {}", path.display()), e)),
        }
    }

    async fn archive(&self, code: &str) -> Result<PathBuf, CadenzaError> {
        tokio::fs::create_dir_all(&self.saved_dir).await.map_err(|e| {
            storage_err(format!("failed to create {}", self.saved_dir.display()), e)
        })?;

        // create_new claims an index atomically.
        let mut index = 1u32;
        loop {
            let path = layout::saved_path(&self.saved_dir, index);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(code.as_bytes())
                        .await
                        .map_err(|e| storage_err(format!("failed to write {}", path.display()), e))?;
                    file.flush()
                        .await
                        .map_err(|e| storage_err(format!("failed to write {}", path.display()), e))?;
                    debug!(path = %path.display(), "code archived");
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    index = index.checked_add(1).ok_or_else(|| {
                        storage_err(
                            "no free saved-code slot left",
                            io::Error::from(io::ErrorKind::StorageFull),
                        )
                    })?;
                }
                Err(e) => {
                    return Err(storage_err(format!("failed to create {}", path.display()), e));
                }
            }
        }
    }
}
