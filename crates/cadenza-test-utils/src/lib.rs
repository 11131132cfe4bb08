// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cadenza integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a language model or Sonic Pi.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock language model with scripted replies
//! - [`MockSink`] - Records executed code and stop calls
//! - [`MemorySnapshotStore`] - In-memory snapshots with scriptable write failures
//! - [`TestHarness`] - A full controller over a temp-dir snapshot store

pub mod harness;
pub mod mock_provider;
pub mod mock_sink;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_provider::MockProvider;
pub use mock_sink::MockSink;
pub use mock_store::MemorySnapshotStore;
