// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation controller for Cadenza.
//!
//! Turns free-text model replies into validated actions and applies them to
//! the audio engine:
//!
//! - [`parser`]: JSON reply -> ordered [`Action`](cadenza_core::Action) list
//! - [`retry`]: bounded re-prompting when a reply does not parse
//! - [`accumulator`]: per-turn code batching, snapshots and execution
//! - [`executor`]: stop, new song, undo, inquiry and unknown actions
//! - [`session`]: the turn FSM and conversation history

pub mod accumulator;
pub mod executor;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod session;

pub use accumulator::{CodeAccumulator, ExecutionOutcome, FRAGMENT_SEPARATOR, ReplayStep};
pub use executor::{ActionExecutor, ActionOutcome};
pub use parser::parse_actions;
pub use prompt::{DEFAULT_SYSTEM_PROMPT, load_system_prompt};
pub use retry::{AcceptedTurn, RetryCoordinator};
pub use session::{
    ControllerState, NOTHING_TO_SAVE_MESSAGE, RETRIES_EXHAUSTED_MESSAGE, SessionController,
    render_user_error,
};
