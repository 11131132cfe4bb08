// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock audio sink that records what would have been played.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadenza_core::traits::adapter::PluginAdapter;
use cadenza_core::traits::sink::AudioSink;
use cadenza_core::types::{AdapterType, HealthStatus};
use cadenza_core::CadenzaError;

/// Records executed code and stop calls. Failures can be scripted per
/// operation and stay in effect until cleared.
pub struct MockSink {
    executed: Mutex<Vec<String>>,
    stop_calls: AtomicUsize,
    execute_failure: Mutex<Option<String>>,
    stop_failure: Mutex<Option<String>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            stop_calls: AtomicUsize::new(0),
            execute_failure: Mutex::new(None),
            stop_failure: Mutex::new(None),
        }
    }

    /// Makes every following `execute` fail with `message`, or succeed on `None`.
    pub async fn set_execute_failure(&self, message: Option<&str>) {
        *self.execute_failure.lock().await = message.map(str::to_string);
    }

    /// Makes every following `stop` fail with `message`, or succeed on `None`.
    pub async fn set_stop_failure(&self, message: Option<&str>) {
        *self.stop_failure.lock().await = message.map(str::to_string);
    }

    /// Code passed to `execute`, including calls that were made to fail.
    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }

    pub async fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSink {
    fn name(&self) -> &str {
        "mock-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, CadenzaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CadenzaError> {
        Ok(())
    }
}

#[async_trait]
impl AudioSink for MockSink {
    async fn execute(&self, code: &str) -> Result<(), CadenzaError> {
        self.executed.lock().await.push(code.to_string());
        match self.execute_failure.lock().await.clone() {
            Some(message) => Err(CadenzaError::Sink {
                message,
                source: None,
            }),
            None => Ok(()),
        }
    }

    async fn stop(&self) -> Result<(), CadenzaError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        match self.stop_failure.lock().await.clone() {
            Some(message) => Err(CadenzaError::Sink {
                message,
                source: None,
            }),
            None => Ok(()),
        }
    }
}
