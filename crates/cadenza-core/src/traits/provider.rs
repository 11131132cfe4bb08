// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model provider trait for language-model integrations.

use async_trait::async_trait;

use crate::error::CadenzaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ChatMessage;

/// Adapter for a chat-completion language model.
///
/// The controller treats the model as an opaque, possibly slow generator
/// whose output may be malformed. Implementations must not retry on their
/// own; a failed call surfaces as [`CadenzaError::Provider`].
#[async_trait]
pub trait ModelProvider: PluginAdapter {
    /// Sends the full message list and returns the reply text.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CadenzaError>;
}
