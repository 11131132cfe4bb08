// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential resolution for Azure OpenAI.
//!
//! Each value is taken from the config first, then the environment, then a
//! `KEY=value` file at `~/.api_keys`.

use std::collections::HashMap;

use cadenza_config::model::AzureConfig;
use cadenza_core::CadenzaError;
use secrecy::SecretString;
use tracing::debug;

pub const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";

/// Everything needed to address one deployment.
#[derive(Debug)]
pub struct Credentials {
    pub api_key: SecretString,
    pub endpoint: String,
    pub deployment: String,
}

/// Resolves credentials from config, environment and `~/.api_keys`.
pub fn resolve(config: &AzureConfig) -> Result<Credentials, CadenzaError> {
    let file = load_api_keys_file();
    resolve_with(config, |name| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| file.get(name).cloned())
    })
}

/// Resolves credentials with `lookup` standing in for environment and file.
pub fn resolve_with(
    config: &AzureConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, CadenzaError> {
    let pick = |configured: &Option<String>, var: &str, key: &str| {
        configured
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| lookup(var))
            .ok_or_else(|| {
                CadenzaError::Config(format!(
                    "Azure OpenAI {key} not found. Set azure.{key} in config, the {var} \
                     environment variable, or {var} in ~/.api_keys."
                ))
            })
    };

    Ok(Credentials {
        api_key: SecretString::from(pick(&config.api_key, API_KEY_VAR, "api_key")?),
        endpoint: pick(&config.endpoint, ENDPOINT_VAR, "endpoint")?,
        deployment: pick(&config.deployment_name, DEPLOYMENT_VAR, "deployment_name")?,
    })
}

fn load_api_keys_file() -> HashMap<String, String> {
    let Some(path) = dirs::home_dir().map(|h| h.join(".api_keys")) else {
        return HashMap::new();
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            debug!(path = %path.display(), "read api keys file");
            parse_api_keys(&content)
        }
        Err(_) => HashMap::new(),
    }
}

/// Parses `KEY=value` lines. Blank lines, `#` comments and lines without
/// `=` are skipped; surrounding quotes are stripped from values.
pub fn parse_api_keys(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
