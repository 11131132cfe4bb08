// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Azure OpenAI provider adapter for Cadenza.
//!
//! Implements [`ModelProvider`] over the chat-completions endpoint of a
//! single deployment.

pub mod client;
pub mod credentials;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use cadenza_config::model::AzureConfig;
use cadenza_core::error::CadenzaError;
use cadenza_core::traits::{ModelProvider, PluginAdapter};
use cadenza_core::types::{AdapterType, ChatMessage, HealthStatus};
use tracing::{debug, info};

use crate::client::AzureClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

/// Azure OpenAI provider implementing [`ModelProvider`].
///
/// Credential resolution order per value: config -> environment variable ->
/// `~/.api_keys`. See [`credentials`].
pub struct AzureProvider {
    client: AzureClient,
    deployment: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl AzureProvider {
    /// Creates a provider from the `[azure]` config section.
    pub fn new(config: &AzureConfig) -> Result<Self, CadenzaError> {
        let creds = credentials::resolve(config)?;
        let client = AzureClient::new(
            &creds.api_key,
            &creds.endpoint,
            &creds.deployment,
            &config.api_version,
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(
            deployment = %creds.deployment,
            api_version = %config.api_version,
            "Azure OpenAI provider initialized"
        );

        Ok(Self {
            client,
            deployment: creds.deployment,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: AzureClient, temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            client,
            deployment: "test".into(),
            temperature,
            max_tokens,
        }
    }

    fn to_request(&self, messages: &[ChatMessage]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for AzureProvider {
    fn name(&self) -> &str {
        "azure-openai"
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
impl ModelProvider for AzureProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CadenzaError> {
        debug!(
            deployment = %self.deployment,
            messages = messages.len(),
            "sending completion request"
        );
        self.client.complete(&self.to_request(messages)).await
    }
}
