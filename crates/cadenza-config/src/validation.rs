// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::CadenzaConfig;

/// Validate a deserialized configuration.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &CadenzaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.max_retries == 0 {
        fail("agent.max_retries must be at least 1".to_string());
    }

    if !matches!(
        config.agent.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        fail(format!(
            "agent.log_level `{}` is not one of trace, debug, info, warn, error",
            config.agent.log_level
        ));
    }

    if !(0.0..=2.0).contains(&config.azure.temperature) {
        fail(format!(
            "azure.temperature must be between 0.0 and 2.0, got {}",
            config.azure.temperature
        ));
    }

    if config.azure.timeout_secs == 0 {
        fail("azure.timeout_secs must be at least 1".to_string());
    }

    if let Some(endpoint) = &config.azure.endpoint {
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            fail(format!("azure.endpoint `{endpoint}` must be an http(s) URL"));
        }
    }

    if config.sonic_pi.command.trim().is_empty() {
        fail("sonic_pi.command must not be empty".to_string());
    }

    if config.sonic_pi.timeout_secs == 0 {
        fail("sonic_pi.timeout_secs must be at least 1".to_string());
    }

    if config.storage.sessions_dir.trim().is_empty() {
        fail("storage.sessions_dir must not be empty".to_string());
    }

    if config.storage.saved_dir.trim().is_empty() {
        fail("storage.saved_dir must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
