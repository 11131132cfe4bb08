// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language model for deterministic testing.
//!
//! `MockProvider` implements `ModelProvider` with pre-configured replies and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadenza_core::traits::adapter::PluginAdapter;
use cadenza_core::traits::provider::ModelProvider;
use cadenza_core::types::{AdapterType, ChatMessage, HealthStatus};
use cadenza_core::CadenzaError;

enum Scripted {
    Reply(String),
    Fail(String),
}

/// A mock model that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned, which does not parse as
/// an action list.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    delay_ms: AtomicU64,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay_ms: AtomicU64::new(0),
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                responses.into_iter().map(Scripted::Reply).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay_ms: AtomicU64::new(0),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Reply(text.into()));
    }

    /// Queue a call failure, surfaced as `CadenzaError::Provider`.
    pub async fn add_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.into()));
    }

    /// Makes every later call wait `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Every message list sent so far, oldest first.
    pub async fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CadenzaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CadenzaError> {
        Ok(())
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CadenzaError> {
        self.requests.lock().await.push(messages.to_vec());

        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(CadenzaError::Provider {
                message,
                source: None,
            }),
            None => Ok("mock response".to_string()),
        }
    }
}
