// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the controller.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod provider;
pub mod sink;
pub mod storage;

pub use adapter::PluginAdapter;
pub use provider::ModelProvider;
pub use sink::AudioSink;
pub use storage::SnapshotStore;
