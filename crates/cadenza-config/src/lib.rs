// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Cadenza live-coding controller.
//!
//! Every entry point loads through figment, validates the result, and turns
//! failures into [`ConfigError`] diagnostics that point into the TOML that
//! produced them.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CadenzaConfig;

/// Loads from the standard file locations plus `CADENZA_*` env vars.
pub fn load_and_validate() -> Result<CadenzaConfig, Vec<ConfigError>> {
    validated(loader::load_config(), || {
        loader::config_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Loads from one explicit file plus `CADENZA_*` env vars.
pub fn load_and_validate_path(path: &Path) -> Result<CadenzaConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Loads from a TOML string alone.
pub fn load_and_validate_str(toml_content: &str) -> Result<CadenzaConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Sources are only read when figment reports an error.
fn validated(
    loaded: Result<CadenzaConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<CadenzaConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (path.display().to_string(), content))
}
