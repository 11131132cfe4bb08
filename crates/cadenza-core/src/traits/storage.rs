// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot store trait for persisting executed code.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::CadenzaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CodeSnapshot, SessionId};

/// Adapter for code snapshot persistence.
///
/// Snapshots are numbered `1..=n` per session. The store only needs to
/// address them by `(session, sequence)`; numbering is owned by the caller.
/// Failures surface as [`CadenzaError::Storage`].
#[async_trait]
pub trait SnapshotStore: PluginAdapter {
    /// Returns where a session's snapshots live, without touching storage.
    fn session_location(&self, session_id: &SessionId) -> PathBuf;

    /// Prepares storage for a new session and returns its location.
    async fn open_session(&self, session_id: &SessionId) -> Result<PathBuf, CadenzaError>;

    /// Persists a snapshot and returns where it landed.
    async fn write(&self, snapshot: &CodeSnapshot) -> Result<PathBuf, CadenzaError>;

    /// Reads back snapshot `sequence` of a session.
    async fn read(&self, session_id: &SessionId, sequence: u32) -> Result<String, CadenzaError>;

    /// Removes snapshot `sequence` of a session.
    async fn delete(&self, session_id: &SessionId, sequence: u32) -> Result<(), CadenzaError>;

    /// Saves code outside any session under the next free name.
    async fn archive(&self, code: &str) -> Result<PathBuf, CadenzaError>;
}
