// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete controller with a mock model, a mock
//! sink and a real filesystem snapshot store in a temp directory. Provides
//! `send_message()` to drive full turns in tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cadenza_agent::SessionController;
use cadenza_config::model::StorageConfig;
use cadenza_core::CadenzaError;
use cadenza_storage::FileSnapshotStore;

use crate::mock_provider::MockProvider;
use crate::mock_sink::MockSink;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    system_prompt: Option<String>,
    max_retries: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            system_prompt: None,
            max_retries: 3,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Set the per-turn model call limit.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build the test harness, creating the temp store and the controller.
    pub async fn build(self) -> Result<TestHarness, CadenzaError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| CadenzaError::Storage {
            message: "failed to create temp dir".into(),
            source: Box::new(e),
        })?;

        let storage_config = StorageConfig {
            sessions_dir: temp_dir.path().join("sessions").display().to_string(),
            saved_dir: temp_dir.path().join("saved").display().to_string(),
        };
        let store = Arc::new(FileSnapshotStore::new(&storage_config));
        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let sink = Arc::new(MockSink::new());

        let controller = SessionController::new(
            provider.clone(),
            sink.clone(),
            store.clone(),
            self.system_prompt
                .unwrap_or_else(|| "You are a test live coder.".to_string()),
            self.max_retries,
        )
        .await?;

        Ok(TestHarness {
            controller,
            provider,
            sink,
            store,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The controller under test.
    pub controller: SessionController,
    /// The mock model.
    pub provider: Arc<MockProvider>,
    /// The mock audio sink.
    pub sink: Arc<MockSink>,
    /// Filesystem store rooted in the temp directory.
    pub store: Arc<FileSnapshotStore>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs one full turn and returns the reply text.
    pub async fn send_message(&mut self, text: &str) -> String {
        self.controller.handle_user_message(text).await
    }

    /// Add a reply to the mock provider's queue.
    pub async fn add_provider_response(&self, text: impl Into<String>) {
        self.provider.add_response(text).await;
    }

    /// Directory of the controller's current session.
    pub fn session_dir(&self) -> &Path {
        &self.controller.session().code_dir
    }

    /// Snapshot files of the current session, sorted by name.
    pub fn snapshot_files(&self) -> Vec<PathBuf> {
        list_sorted(self.session_dir())
    }

    /// Files written by saveCurrentCode, sorted by name.
    pub fn saved_files(&self) -> Vec<PathBuf> {
        list_sorted(self.store.saved_dir())
    }
}

fn list_sorted(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}
