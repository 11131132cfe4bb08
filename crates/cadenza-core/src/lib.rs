// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cadenza live-coding controller.
//!
//! This crate provides the error taxonomy, the typed action model decoded
//! from language-model turns, session and snapshot types, and the adapter
//! traits the controller drives: the language model, the audio sink, and
//! the snapshot store.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CadenzaError, ParseError};
pub use types::{
    Action, AdapterType, ChatMessage, ChatRole, CodeSnapshot, HealthStatus, Message, Session,
    SessionId,
};

// Re-export all adapter traits at crate root.
pub use traits::{AudioSink, ModelProvider, PluginAdapter, SnapshotStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadenza_error_has_all_variants() {
        let _config = CadenzaError::Config("test".into());
        let _provider = CadenzaError::Provider {
            message: "test".into(),
            source: None,
        };
        let _sink = CadenzaError::Sink {
            message: "test".into(),
            source: None,
        };
        let _storage = CadenzaError::Storage {
            message: "test".into(),
            source: Box::new(std::io::Error::other("test")),
        };
        let _exhausted = CadenzaError::RetriesExhausted {
            attempts: 3,
            last_error: ParseError::Syntax("test".into()),
        };
        let _internal = CadenzaError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Sink, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_model_provider<T: ModelProvider>() {}
        fn _assert_audio_sink<T: AudioSink>() {}
        fn _assert_snapshot_store<T: SnapshotStore>() {}
    }
}
