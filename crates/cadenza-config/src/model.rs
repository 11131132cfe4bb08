// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cadenza controller.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Cadenza configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CadenzaConfig {
    /// Controller behavior and prompt settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Azure OpenAI settings.
    #[serde(default)]
    pub azure: AzureConfig,

    /// Sonic Pi engine invocation settings.
    #[serde(default)]
    pub sonic_pi: SonicPiConfig,

    /// Snapshot and saved-code locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Controller behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the shell banner.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Model calls per turn before giving up on unparseable replies.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Path to a library of example Sonic Pi code appended to the system prompt.
    #[serde(default)]
    pub example_code_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            max_retries: default_max_retries(),
            system_prompt: None,
            system_prompt_file: None,
            example_code_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "cadenza".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_retries() -> u32 {
    3
}

/// Azure OpenAI chat-completions configuration.
///
/// Unset credentials fall back to `AZURE_OPENAI_*` environment variables
/// and then to `~/.api_keys` when the provider is built.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AzureConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub deployment_name: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap. `None` leaves it to the service.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Whole-request timeout; expiry is reported as a provider error.
    #[serde(default = "default_azure_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            deployment_name: None,
            api_version: default_api_version(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_azure_timeout_secs(),
        }
    }
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_azure_timeout_secs() -> u64 {
    120
}

/// Sonic Pi command-line invocation.
///
/// Code is written to the command's stdin; a non-zero exit is a failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SonicPiConfig {
    #[serde(default = "default_sonic_pi_command")]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Code sent to stop playback.
    #[serde(default = "default_stop_code")]
    pub stop_code: String,

    /// Per-invocation timeout; expiry is reported as a sink error.
    #[serde(default = "default_sonic_pi_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SonicPiConfig {
    fn default() -> Self {
        Self {
            command: default_sonic_pi_command(),
            args: Vec::new(),
            stop_code: default_stop_code(),
            timeout_secs: default_sonic_pi_timeout_secs(),
        }
    }
}

fn default_sonic_pi_command() -> String {
    "sonic_pi4".to_string()
}

fn default_stop_code() -> String {
    "stop".to_string()
}

fn default_sonic_pi_timeout_secs() -> u64 {
    30
}

/// Filesystem locations for code persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root under which each session gets its own snapshot folder.
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: String,

    /// Folder receiving explicitly saved code (`1.pi`, `2.pi`, ...).
    #[serde(default = "default_saved_dir")]
    pub saved_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_dir: default_sessions_dir(),
            saved_dir: default_saved_dir(),
        }
    }
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("cadenza"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_sessions_dir() -> String {
    data_root().join("sessions").to_string_lossy().into_owned()
}

fn default_saved_dir() -> String {
    data_root().join("saved").to_string_lossy().into_owned()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8000
}
