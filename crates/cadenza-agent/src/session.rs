// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn-level controller that ties the model, the action pipeline and the
//! conversation history together.
//!
//! Each user message goes through: Idle -> AwaitingModel -> Dispatching -> Idle.
//! A `new_song` action passes through Resetting while the session is replaced.
//!
//! Within one turn, non-code actions run first in the order the model sent
//! them, then all `generate_code` fragments run as a single snapshot. The
//! reply lines follow the same order.

use std::sync::Arc;

use cadenza_core::{
    Action, AudioSink, CadenzaError, Message, ModelProvider, Session, SnapshotStore,
};
use tracing::{debug, info, warn};

use crate::accumulator::CodeAccumulator;
use crate::executor::ActionExecutor;
use crate::retry::RetryCoordinator;

/// Reply shown when the model never produced a parseable answer.
pub const RETRIES_EXHAUSTED_MESSAGE: &str =
    "Failed to generate valid response after multiple attempts.";

/// Reply shown when `/save` has no code to write.
pub const NOTHING_TO_SAVE_MESSAGE: &str = "No code has been played in this session yet. \
     Asking the model for the running code is not implemented yet.";

/// States in the controller FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for the next user message.
    Idle,
    /// Model call (with parse retries) in flight.
    AwaitingModel,
    /// Running the accepted actions.
    Dispatching,
    /// Replacing the session for a `new_song` action.
    Resetting,
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerState::Idle => write!(f, "idle"),
            ControllerState::AwaitingModel => write!(f, "awaiting_model"),
            ControllerState::Dispatching => write!(f, "dispatching"),
            ControllerState::Resetting => write!(f, "resetting"),
        }
    }
}

/// Owns one conversation and its music session.
///
/// Callers serialize access; the HTTP gateway wraps the controller in a
/// mutex so turns never interleave.
pub struct SessionController {
    state: ControllerState,
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn SnapshotStore>,
    retry: RetryCoordinator,
    executor: ActionExecutor,
    code: CodeAccumulator,
    system_prompt: String,
    history: Vec<Message>,
}

impl SessionController {
    /// Creates a controller and opens its first session.
    pub async fn new(
        provider: Arc<dyn ModelProvider>,
        sink: Arc<dyn AudioSink>,
        store: Arc<dyn SnapshotStore>,
        system_prompt: String,
        max_retries: u32,
    ) -> Result<Self, CadenzaError> {
        let code = CodeAccumulator::open(store.clone(), sink.clone()).await?;
        info!(
            session_id = %code.session().id,
            provider = provider.name(),
            sink = sink.name(),
            max_retries,
            "session controller ready"
        );

        Ok(Self {
            state: ControllerState::Idle,
            provider,
            store,
            retry: RetryCoordinator::new(max_retries),
            executor: ActionExecutor::new(sink),
            code,
            system_prompt,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        self.code.session()
    }

    pub fn current_code(&self) -> &str {
        self.code.current_code()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The conversation so far, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Runs one full turn and returns the reply text.
    ///
    /// Every failure is rendered into the reply; this never returns an
    /// error and always leaves the controller Idle.
    pub async fn handle_user_message(&mut self, text: &str) -> String {
        let reply = match self.run_turn(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session_id = %self.code.session().id, error = %e, "turn failed");
                render_user_error(&e)
            }
        };
        self.transition(ControllerState::Idle);
        reply
    }

    async fn run_turn(&mut self, text: &str) -> Result<String, CadenzaError> {
        self.transition(ControllerState::AwaitingModel);

        let prior = self.history.len();
        self.history.push(Message::from_user(text));

        let turn = self
            .retry
            .obtain_actions(
                self.provider.as_ref(),
                &self.system_prompt,
                &self.history[..prior],
                text,
            )
            .await?;

        self.transition(ControllerState::Dispatching);
        debug!(
            attempts = turn.attempts,
            actions = turn.actions.len(),
            "dispatching accepted turn"
        );

        let (code_actions, control): (Vec<Action>, Vec<Action>) =
            turn.actions.into_iter().partition(Action::is_code);

        let mut lines = Vec::with_capacity(control.len() + 1);
        for action in &control {
            if matches!(action, Action::NewSong) {
                self.transition(ControllerState::Resetting);
            }
            let outcome = self.executor.apply(action, &mut self.code).await;
            self.transition(ControllerState::Dispatching);
            lines.push(outcome.to_string());
        }

        let fragments: Vec<String> = code_actions
            .into_iter()
            .filter_map(|action| match action {
                Action::GenerateCode { code } => Some(code),
                _ => None,
            })
            .collect();

        if !fragments.is_empty() {
            match self.code.apply_generated_code(&fragments).await {
                Ok(outcome) => lines.push(outcome.to_string()),
                Err(e) => {
                    warn!(error = %e, "snapshot write failed, code not executed");
                    lines.push(render_user_error(&e));
                }
            }
        }

        self.history.push(Message::from_assistant(turn.raw));
        Ok(lines.join("\n"))
    }

    /// Clears the conversation history.
    ///
    /// The session, its snapshots and the current code are kept, and
    /// playback is not stopped.
    pub fn new_chat(&mut self) -> String {
        let cleared = self.history.len();
        self.history.clear();
        info!(session_id = %self.code.session().id, cleared, "chat history cleared");
        "New chat started.".to_string()
    }

    /// Stops playback outside any model turn.
    pub async fn stop_music(&self) -> String {
        self.executor.stop().await.to_string()
    }

    /// Saves the current code under the saved-code directory.
    pub async fn save_current_code(&self) -> String {
        let code = self.code.current_code();
        if code.is_empty() {
            return NOTHING_TO_SAVE_MESSAGE.to_string();
        }

        match self.store.archive(code).await {
            Ok(path) => {
                info!(path = %path.display(), "current code saved");
                format!("Code saved to {}", path.display())
            }
            Err(e) => render_user_error(&e),
        }
    }

    /// Re-executes every snapshot of the current session in order.
    pub async fn replay_session(&self) -> String {
        let steps = self.code.replay_all().await;
        if steps.is_empty() {
            return "Nothing to replay in this session.".to_string();
        }
        steps
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn transition(&mut self, next: ControllerState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "controller state change");
            self.state = next;
        }
    }
}

/// Renders a turn-level error as reply text.
pub fn render_user_error(err: &CadenzaError) -> String {
    match err {
        CadenzaError::RetriesExhausted { .. } => RETRIES_EXHAUSTED_MESSAGE.to_string(),
        CadenzaError::Provider { message, .. } => {
            format!("Error getting a response from the model: {message}")
        }
        CadenzaError::Storage { message, source } => {
            format!("Error saving code: {message}: {source}")
        }
        CadenzaError::Sink { message, .. } => format!("Error from Sonic Pi: {message}"),
        CadenzaError::Config(message) => format!("Configuration error: {message}"),
        CadenzaError::Internal(message) => format!("Internal error: {message}"),
    }
}
