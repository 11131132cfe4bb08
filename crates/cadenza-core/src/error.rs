// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cadenza controller.

use thiserror::Error;

/// The primary error type used across all Cadenza adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CadenzaError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Language-model call failures (network, authentication, quota, empty reply).
    ///
    /// Never retried by the controller.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The audio engine rejected code or could not be reached.
    #[error("sink error: {message}")]
    Sink {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Snapshot or saved-code persistence failed.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Every attempt to obtain a parseable reply from the model failed.
    #[error("no valid model response after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: ParseError,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Rejection of a model reply at the action parse boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The reply is not JSON, or not an object / array of objects.
    #[error("invalid JSON: {0}")]
    Syntax(String),

    /// A recognised action lacks a field it cannot be executed without.
    #[error("action `{action}` is missing required field `{field}`")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },
}
