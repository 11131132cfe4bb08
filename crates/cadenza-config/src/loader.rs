// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cadenza.toml` > `~/.config/cadenza/cadenza.toml` >
//! `/etc/cadenza/cadenza.toml` with environment variable overrides via `CADENZA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CadenzaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cadenza/cadenza.toml`
/// 3. `~/.config/cadenza/cadenza.toml`
/// 4. `./cadenza.toml`
/// 5. `CADENZA_*` environment variables
pub fn load_config() -> Result<CadenzaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CadenzaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadenzaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CadenzaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadenzaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/cadenza/cadenza.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cadenza/cadenza.toml"));
    }
    paths.push(PathBuf::from("cadenza.toml"));
    paths
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(CadenzaConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CADENZA_AZURE_API_KEY` must become `azure.api_key`, and
/// `CADENZA_SONIC_PI_STOP_CODE` must become `sonic_pi.stop_code`.
fn env_provider() -> Env {
    Env::prefixed("CADENZA_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name onto a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["agent", "azure", "sonic_pi", "storage", "gateway"];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
