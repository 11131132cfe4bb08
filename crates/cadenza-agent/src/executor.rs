// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch of non-code actions.
//!
//! Code actions are batched per turn by the [`CodeAccumulator`]; everything
//! else is handled here, one outcome per action.

use std::fmt;
use std::sync::Arc;

use cadenza_core::{Action, AudioSink, CadenzaError};
use tracing::{debug, warn};

use crate::accumulator::{CodeAccumulator, sink_detail};

/// User-visible result of one dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Stopped,
    /// Sink error text, shown verbatim.
    StopFailed(String),
    /// The old session was closed and a new one started.
    NewSong,
    /// Reset happened but the new session's storage could not be prepared.
    NewSongStorageFailed(String),
    /// Undo removed at most a snapshot; playback was not reverted.
    UndoNotImplemented(String),
    UndoFailed(String),
    Information(String),
    Unknown(String),
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("Music stopped."),
            Self::StopFailed(e) => f.write_str(e),
            Self::NewSong => f.write_str("Ready for a new song."),
            Self::NewSongStorageFailed(e) => {
                write!(f, "Ready for a new song, but the session folder could not be created: {e}")
            }
            Self::UndoNotImplemented(detail) => {
                write!(f, "Undo functionality not implemented yet: {detail}")
            }
            Self::UndoFailed(e) => write!(f, "Error undoing last change: {e}"),
            Self::Information(text) => write!(f, "Information: {text}"),
            Self::Unknown(tag) => write!(f, "Unknown action: {tag}"),
        }
    }
}

/// Applies stop, new-song, undo, inquiry and unknown actions.
pub struct ActionExecutor {
    sink: Arc<dyn AudioSink>,
}

impl ActionExecutor {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self { sink }
    }

    /// Stops playback on the sink.
    pub async fn stop(&self) -> ActionOutcome {
        match self.sink.stop().await {
            Ok(()) => ActionOutcome::Stopped,
            Err(e) => {
                warn!(error = %e, "stop failed");
                ActionOutcome::StopFailed(sink_detail(e))
            }
        }
    }

    /// Applies one non-code action.
    ///
    /// `GenerateCode` is not expected here; if one slips through it is
    /// reported as an unknown action rather than executed outside a snapshot.
    pub async fn apply(&self, action: &Action, code: &mut CodeAccumulator) -> ActionOutcome {
        debug!(action = action.tag(), "dispatching action");
        match action {
            Action::Stop => self.stop().await,
            Action::NewSong => {
                if let Err(e) = self.sink.stop().await {
                    debug!(error = %e, "stop before new song failed, continuing");
                }
                match code.start_new_session().await {
                    Ok(_) => ActionOutcome::NewSong,
                    Err(e) => ActionOutcome::NewSongStorageFailed(storage_detail(e)),
                }
            }
            Action::Undo => match code.undo_last().await {
                Ok(Some(sequence)) => ActionOutcome::UndoNotImplemented(format!(
                    "removed snapshot {sequence}, but the music and current code were left unchanged."
                )),
                Ok(None) => ActionOutcome::UndoNotImplemented(
                    "there is no snapshot to remove in this session.".to_string(),
                ),
                Err(e) => ActionOutcome::UndoFailed(storage_detail(e)),
            },
            Action::UserInquiry { response_text } => {
                ActionOutcome::Information(response_text.clone())
            }
            Action::Unknown { raw_tag } => ActionOutcome::Unknown(raw_tag.clone()),
            Action::GenerateCode { .. } => ActionOutcome::Unknown(action.tag().to_string()),
        }
    }

    /// Applies `actions` in order, one outcome each.
    pub async fn execute(
        &self,
        actions: &[Action],
        code: &mut CodeAccumulator,
    ) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            outcomes.push(self.apply(action, code).await);
        }
        outcomes
    }
}

fn storage_detail(err: CadenzaError) -> String {
    match err {
        CadenzaError::Storage { message, source } => format!("{message}: {source}"),
        other => other.to_string(),
    }
}
