// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn code accumulation, snapshotting and execution.
//!
//! The accumulator owns the active [`Session`] and the current code. Each
//! turn's `generate_code` fragments are joined into one unit, written as the
//! next numbered snapshot, and only then handed to the audio sink. A failed
//! snapshot write stops the unit from ever reaching the sink, so every piece
//! of executed code has a snapshot on disk.

use std::fmt;
use std::sync::Arc;

use cadenza_core::{AudioSink, CadenzaError, CodeSnapshot, Session, SessionId, SnapshotStore};
use tracing::{debug, info, warn};

/// Separator placed between fragments of one turn.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// What happened when a code unit was sent to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Executed { sequence: u32, code: String },
    Failed { sequence: u32, code: String, error: String },
}

impl ExecutionOutcome {
    pub fn sequence(&self) -> u32 {
        match self {
            Self::Executed { sequence, .. } | Self::Failed { sequence, .. } => *sequence,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed { code, .. } => {
                write!(f, "Code executed successfully:\n```\n{code}\n```")
            }
            Self::Failed { error, .. } => write!(f, "Error executing code: {error}"),
        }
    }
}

/// Result of re-running one stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub sequence: u32,
    pub error: Option<String>,
}

impl fmt::Display for ReplayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "Replayed snapshot {}.", self.sequence),
            Some(e) => write!(f, "Error replaying snapshot {}: {e}", self.sequence),
        }
    }
}

/// Owner of the session, its snapshot counter and the current code.
pub struct CodeAccumulator {
    store: Arc<dyn SnapshotStore>,
    sink: Arc<dyn AudioSink>,
    session: Session,
    current_code: String,
}

impl CodeAccumulator {
    /// Opens a fresh session on `store`.
    pub async fn open(
        store: Arc<dyn SnapshotStore>,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self, CadenzaError> {
        let id = SessionId::generate();
        let dir = store.open_session(&id).await?;
        info!(session_id = %id, dir = %dir.display(), "session opened");

        Ok(Self {
            store,
            sink,
            session: Session::new(id, dir),
            current_code: String::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The most recent code unit handed to the sink, or empty.
    pub fn current_code(&self) -> &str {
        &self.current_code
    }

    /// Joins, snapshots and executes one turn's code fragments.
    ///
    /// Returns `Err` only when the snapshot cannot be written; in that case
    /// nothing changes and the sink is never called. A sink failure is an
    /// `Ok(ExecutionOutcome::Failed)` and keeps the snapshot.
    pub async fn apply_generated_code(
        &mut self,
        fragments: &[String],
    ) -> Result<ExecutionOutcome, CadenzaError> {
        let snapshot = CodeSnapshot {
            session_id: self.session.id.clone(),
            sequence: self.session.code_counter + 1,
            code: fragments.join(FRAGMENT_SEPARATOR),
        };

        let path = self.store.write(&snapshot).await?;
        let CodeSnapshot { sequence, code, .. } = snapshot;
        self.session.code_counter = sequence;
        self.current_code.clone_from(&code);
        debug!(
            session_id = %self.session.id,
            sequence,
            path = %path.display(),
            fragments = fragments.len(),
            "snapshot written"
        );

        match self.sink.execute(&code).await {
            Ok(()) => {
                info!(session_id = %self.session.id, sequence, "code executed");
                Ok(ExecutionOutcome::Executed { sequence, code })
            }
            Err(e) => {
                warn!(session_id = %self.session.id, sequence, error = %e, "code execution failed");
                Ok(ExecutionOutcome::Failed {
                    sequence,
                    code,
                    error: sink_detail(e),
                })
            }
        }
    }

    /// Deletes the newest snapshot and returns its sequence number.
    ///
    /// Playback and the current code are left as they are. Returns
    /// `Ok(None)` when the session has no snapshots.
    pub async fn undo_last(&mut self) -> Result<Option<u32>, CadenzaError> {
        let sequence = self.session.code_counter;
        if sequence == 0 {
            return Ok(None);
        }

        self.store.delete(&self.session.id, sequence).await?;
        self.session.code_counter = sequence - 1;
        info!(session_id = %self.session.id, sequence, "snapshot removed");
        Ok(Some(sequence))
    }

    /// Starts a new session and clears the current code.
    ///
    /// The in-memory reset always happens. An error means only that the
    /// session directory could not be prepared yet.
    pub async fn start_new_session(&mut self) -> Result<&Session, CadenzaError> {
        let id = SessionId::generate();
        let dir = self.store.session_location(&id);
        let previous = std::mem::replace(&mut self.session, Session::new(id, dir));
        self.current_code.clear();
        info!(
            previous = %previous.id,
            session_id = %self.session.id,
            "new session started"
        );

        self.store.open_session(&self.session.id).await?;
        Ok(&self.session)
    }

    /// Re-executes every snapshot of the session in sequence order.
    ///
    /// A read or execution failure is recorded for that step and the
    /// remaining snapshots still run.
    pub async fn replay_all(&self) -> Vec<ReplayStep> {
        let mut steps = Vec::with_capacity(self.session.code_counter as usize);

        for sequence in 1..=self.session.code_counter {
            let error = match self.store.read(&self.session.id, sequence).await {
                Ok(code) => self.sink.execute(&code).await.err().map(sink_detail),
                Err(e) => Some(e.to_string()),
            };
            if let Some(ref e) = error {
                warn!(session_id = %self.session.id, sequence, error = %e, "replay step failed");
            }
            steps.push(ReplayStep { sequence, error });
        }

        steps
    }
}

/// Strips the error-kind prefix from sink failures for user display.
pub(crate) fn sink_detail(err: CadenzaError) -> String {
    match err {
        CadenzaError::Sink { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_test_utils::{MemorySnapshotStore, MockSink};

    async fn accumulator() -> (CodeAccumulator, Arc<MemorySnapshotStore>, Arc<MockSink>) {
        let store = Arc::new(MemorySnapshotStore::new());
        let sink = Arc::new(MockSink::new());
        let acc = CodeAccumulator::open(store.clone(), sink.clone()).await.unwrap();
        (acc, store, sink)
    }

    #[tokio::test]
    async fn fragments_are_joined_snapshotted_and_executed() {
        let (mut acc, store, sink) = accumulator().await;

        let outcome = acc
            .apply_generated_code(&["play 60".into(), "sleep 1".into()])
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ExecutionOutcome::Executed {
                sequence: 1,
                code: "play 60\n\nsleep 1".into()
            }
        );
        assert_eq!(acc.session().code_counter, 1);
        assert_eq!(acc.current_code(), "play 60\n\nsleep 1");
        assert_eq!(
            store.snapshot(&acc.session().id, 1).await.as_deref(),
            Some("play 60\n\nsleep 1")
        );
        assert_eq!(sink.executed().await, vec!["play 60\n\nsleep 1".to_string()]);
    }

    #[tokio::test]
    async fn counter_advances_by_one_per_turn() {
        let (mut acc, store, _sink) = accumulator().await;
        for n in 1..=3 {
            let outcome = acc
                .apply_generated_code(&[format!("play {n}")])
                .await
                .unwrap();
            assert_eq!(outcome.sequence(), n);
        }
        assert_eq!(store.snapshot_count(&acc.session().id).await, 3);
    }

    #[tokio::test]
    async fn sink_failure_keeps_snapshot_and_current_code() {
        let (mut acc, store, sink) = accumulator().await;
        sink.set_execute_failure(Some("syntax error, unexpected end")).await;

        let outcome = acc.apply_generated_code(&["play".into()]).await.unwrap();

        assert!(!outcome.is_success());
        assert_eq!(
            outcome.to_string(),
            "Error executing code: syntax error, unexpected end"
        );
        assert_eq!(acc.session().code_counter, 1);
        assert_eq!(acc.current_code(), "play");
        assert!(store.snapshot(&acc.session().id, 1).await.is_some());
    }

    #[tokio::test]
    async fn write_failure_skips_execution() {
        let (mut acc, store, sink) = accumulator().await;
        store.set_fail_writes(true);

        let err = acc.apply_generated_code(&["play 60".into()]).await.unwrap_err();

        assert!(matches!(err, CadenzaError::Storage { .. }));
        assert_eq!(acc.session().code_counter, 0);
        assert_eq!(acc.current_code(), "");
        assert!(sink.executed().await.is_empty());
    }

    #[tokio::test]
    async fn undo_removes_newest_snapshot_only() {
        let (mut acc, store, sink) = accumulator().await;
        acc.apply_generated_code(&["a".into()]).await.unwrap();
        acc.apply_generated_code(&["b".into()]).await.unwrap();

        assert_eq!(acc.undo_last().await.unwrap(), Some(2));
        assert_eq!(acc.session().code_counter, 1);
        assert!(store.snapshot(&acc.session().id, 2).await.is_none());
        assert_eq!(acc.current_code(), "b");
        assert_eq!(sink.executed().await.len(), 2);
    }

    #[tokio::test]
    async fn undo_on_empty_session_is_noop() {
        let (mut acc, _store, _sink) = accumulator().await;
        assert_eq!(acc.undo_last().await.unwrap(), None);
    }

    #[tokio::test]
    async fn new_session_resets_counter_and_code() {
        let (mut acc, store, _sink) = accumulator().await;
        let first = acc.session().id.clone();
        acc.apply_generated_code(&["a".into()]).await.unwrap();

        acc.start_new_session().await.unwrap();

        assert_ne!(acc.session().id, first);
        assert_eq!(acc.session().code_counter, 0);
        assert_eq!(acc.current_code(), "");
        assert_eq!(store.snapshot(&first, 1).await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn replay_runs_snapshots_in_order() {
        let (mut acc, _store, sink) = accumulator().await;
        acc.apply_generated_code(&["a".into()]).await.unwrap();
        acc.apply_generated_code(&["b".into()]).await.unwrap();

        let steps = acc.replay_all().await;

        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.error.is_none()));
        assert_eq!(steps[0].to_string(), "Replayed snapshot 1.");
        assert_eq!(sink.executed().await, vec!["a", "b", "a", "b"]);
    }

    proptest::proptest! {
        #[test]
        fn one_snapshot_holds_the_joined_fragments(
            fragments in proptest::collection::vec("[a-z0-9 :_\n]{0,24}", 1..6)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let (mut acc, store, sink) = accumulator().await;
                let expected = fragments.join(FRAGMENT_SEPARATOR);

                acc.apply_generated_code(&fragments).await.unwrap();

                assert_eq!(acc.current_code(), expected);
                assert_eq!(store.snapshot_count(&acc.session().id).await, 1);
                assert_eq!(
                    store.snapshot(&acc.session().id, 1).await.as_deref(),
                    Some(expected.as_str())
                );
                assert_eq!(sink.executed().await, vec![expected.clone()]);
            });
        }
    }
}
