// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem persistence for code snapshots and saved code.
//!
//! Layout:
//!
//! ```text
//! <sessions_dir>/<session id>/code_001.pi
//! <sessions_dir>/<session id>/code_002.pi
//! <saved_dir>/1.pi
//! ```

pub mod adapter;
pub mod layout;

pub use adapter::FileSnapshotStore;
