// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audio sink trait for the live-coding engine that renders code into sound.

use async_trait::async_trait;

use crate::error::CadenzaError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for the external audio engine.
///
/// Each call is a one-shot invocation; the controller does not manage the
/// engine's lifecycle. Failures surface as [`CadenzaError::Sink`].
#[async_trait]
pub trait AudioSink: PluginAdapter {
    /// Runs a unit of code on the engine.
    async fn execute(&self, code: &str) -> Result<(), CadenzaError>;

    /// Stops everything currently playing.
    async fn stop(&self) -> Result<(), CadenzaError>;
}
