// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded parse-retry loop around the model call.
//!
//! Only parse failures are retried. A failed model call aborts the turn
//! immediately, since repeating a network or quota failure rarely helps and
//! costs money.

use cadenza_core::{Action, CadenzaError, ChatMessage, Message, ModelProvider, ParseError};
use tracing::{debug, info, warn};

use crate::parser::parse_actions;

/// A model reply that made it through the parse boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedTurn {
    pub actions: Vec<Action>,
    /// Raw reply text, recorded verbatim in the conversation history.
    pub raw: String,
    /// Model calls spent on this turn, `1..=max_retries`.
    pub attempts: u32,
}

/// Drives up to `max_retries` model calls until one reply parses.
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    max_retries: u32,
}

impl RetryCoordinator {
    /// Creates a coordinator. Values below 1 are raised to 1.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Obtains a parseable reply for `user_input`.
    ///
    /// `history` must not contain the current user input; it is appended as
    /// the final message of every request. After a parse failure the next
    /// request carries the original input followed by the latest error.
    pub async fn obtain_actions(
        &self,
        provider: &dyn ModelProvider,
        system_prompt: &str,
        history: &[Message],
        user_input: &str,
    ) -> Result<AcceptedTurn, CadenzaError> {
        let mut prompt = user_input.to_string();
        let mut last_error: Option<ParseError> = None;

        for attempt in 1..=self.max_retries {
            let messages = build_messages(system_prompt, history, &prompt);
            debug!(attempt, messages = messages.len(), "requesting model reply");

            let raw = provider.generate(&messages).await?;

            match parse_actions(&raw) {
                Ok(actions) => {
                    info!(attempt, actions = actions.len(), "model reply accepted");
                    return Ok(AcceptedTurn {
                        actions,
                        raw,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(attempt, max = self.max_retries, error = %e, "model reply rejected");
                    prompt = correction_prompt(user_input, &e);
                    last_error = Some(e);
                }
            }
        }

        Err(CadenzaError::RetriesExhausted {
            attempts: self.max_retries,
            last_error: last_error.unwrap_or_else(|| {
                ParseError::Syntax("no model reply was obtained".to_string())
            }),
        })
    }
}

/// Assembles `[system] + history + [user prompt]`.
pub fn build_messages(system_prompt: &str, history: &[Message], prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.iter().map(Message::to_chat));
    messages.push(ChatMessage::user(prompt));
    messages
}

/// The user prompt re-sent after a rejected reply.
pub fn correction_prompt(user_input: &str, error: &ParseError) -> String {
    let problem = match error {
        ParseError::Syntax(_) => "Your last response was not valid JSON.",
        ParseError::MissingField { .. } => "Your last response was missing a required field.",
    };
    format!(
        "{user_input}\n\nError in previous response: {problem} \
         Please fix and respond again. Error: {error}"
    )
}
