// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway exposing the session controller to the web UI.
//!
//! All routes share one [`SessionController`](cadenza_agent::SessionController)
//! behind an async mutex, so turns are processed one at a time. Health and
//! history reads go through a published [`ControllerView`] instead.

pub mod handlers;
pub mod server;

pub use server::{ControllerView, GatewayState, ServerConfig, build_router, start_server};
