// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Azure OpenAI chat-completions API.
//!
//! Each call is a single request. Transient failures are reported, not
//! retried; the caller decides what a failed turn means.

use std::time::Duration;

use cadenza_core::CadenzaError;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client bound to one Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureClient {
    client: reqwest::Client,
    url: String,
}

impl AzureClient {
    /// Creates a client for `deployment` on `endpoint`.
    pub fn new(
        api_key: &SecretString,
        endpoint: &str,
        deployment: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, CadenzaError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| CadenzaError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("api-key", key);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CadenzaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            url: completions_url(endpoint, deployment, api_version),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one completion request and returns the trimmed reply text.
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, CadenzaError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| CadenzaError::Provider {
                message: if e.is_timeout() {
                    "request to Azure OpenAI timed out".to_string()
                } else {
                    format!("HTTP request failed: {e}")
                },
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| CadenzaError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, bytes = body.len(), "completion response received");

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Azure OpenAI error ({}): {}",
                    api_err.error.code.as_deref().unwrap_or(status.as_str()),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(CadenzaError::Provider {
                message,
                source: None,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| CadenzaError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CadenzaError::Provider {
                message: "API response contained no choices".into(),
                source: None,
            })?;

        choice
            .message
            .content
            .map(|text| text.trim().to_string())
            .ok_or_else(|| CadenzaError::Provider {
                message: format!(
                    "API response had no content (finish reason: {})",
                    choice.finish_reason.as_deref().unwrap_or("unknown")
                ),
                source: None,
            })
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/')
    )
}
