// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for full conversation turns.
//!
//! Each test builds an isolated TestHarness with a mock model, a mock sink
//! and a filesystem snapshot store in a temp directory.

use cadenza_agent::{ControllerState, NOTHING_TO_SAVE_MESSAGE, RETRIES_EXHAUSTED_MESSAGE};
use cadenza_test_utils::TestHarness;

fn code_reply(code: &str) -> String {
    format!(r#"[{{"action":"generate_code","code":"{code}"}}]"#)
}

// ---- Code turns ----

#[tokio::test]
async fn play_note_writes_snapshot_and_executes() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![code_reply("play 60")])
        .build()
        .await
        .unwrap();

    let reply = harness.send_message("play middle C").await;

    assert_eq!(reply, "Code executed successfully:\n```\nplay 60\n```");
    assert_eq!(harness.controller.session().code_counter, 1);
    assert_eq!(harness.controller.current_code(), "play 60");
    assert_eq!(harness.sink.executed().await, vec!["play 60".to_string()]);

    let files = harness.snapshot_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("code_001.pi"));
    assert_eq!(harness.controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn consecutive_code_turns_number_snapshots_in_order() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![code_reply("play 60"), code_reply("play 64")])
        .build()
        .await
        .unwrap();

    harness.send_message("one").await;
    harness.send_message("two").await;

    let names: Vec<String> = harness
        .snapshot_files()
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(names, vec!["code_001.pi", "code_002.pi"]);
    assert_eq!(harness.controller.current_code(), "play 64");
}

#[tokio::test]
async fn several_fragments_in_one_turn_form_one_snapshot() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![
            r#"[{"action":"generate_code","code":"use_bpm 120"},{"action":"generate_code","code":"play 60"}]"#
                .to_string(),
        ])
        .build()
        .await
        .unwrap();

    harness.send_message("groove").await;

    assert_eq!(harness.snapshot_files().len(), 1);
    assert_eq!(harness.controller.current_code(), "use_bpm 120\n\nplay 60");
    assert_eq!(harness.sink.executed().await.len(), 1);
}

// ---- Non-code actions ----

#[tokio::test]
async fn user_inquiry_answers_without_touching_music() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![
            r#"{"action":"user_inquiry","response":"A live_loop repeats forever."}"#.to_string(),
        ])
        .build()
        .await
        .unwrap();

    let reply = harness.send_message("what is a live_loop?").await;

    assert_eq!(reply, "Information: A live_loop repeats forever.");
    assert!(harness.snapshot_files().is_empty());
    assert!(harness.sink.executed().await.is_empty());
    assert_eq!(harness.controller.session().code_counter, 0);
}

#[tokio::test]
async fn new_song_resets_session_and_stops_playback() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![
            code_reply("play 60"),
            r#"[{"action":"new_song"}]"#.to_string(),
        ])
        .build()
        .await
        .unwrap();

    harness.send_message("play").await;
    let old_session = harness.controller.session().id.clone();

    let reply = harness.send_message("start over").await;

    assert_eq!(reply, "Ready for a new song.");
    assert_ne!(harness.controller.session().id, old_session);
    assert_eq!(harness.controller.session().code_counter, 0);
    assert_eq!(harness.controller.current_code(), "");
    assert!(harness.snapshot_files().is_empty());
    assert_eq!(harness.sink.stop_calls().await, 1);
}

#[tokio::test]
async fn unknown_action_is_reported() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![r#"{"action":"dance"}"#.to_string()])
        .build()
        .await
        .unwrap();

    let reply = harness.send_message("dance").await;
    assert_eq!(reply, "Unknown action: dance");
}

// ---- Retries ----

#[tokio::test]
async fn invalid_replies_exhaust_retries_and_change_nothing() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![
            "not json".to_string(),
            "not json".to_string(),
            "not json".to_string(),
        ])
        .build()
        .await
        .unwrap();

    let reply = harness.send_message("play something").await;

    assert_eq!(reply, RETRIES_EXHAUSTED_MESSAGE);
    assert_eq!(harness.provider.request_count().await, 3);
    assert_eq!(harness.controller.session().code_counter, 0);
    assert!(harness.snapshot_files().is_empty());
    assert!(harness.sink.executed().await.is_empty());
    assert_eq!(harness.controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn retry_then_success_plays_code() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["oops, prose".to_string(), code_reply("play 72")])
        .build()
        .await
        .unwrap();

    let reply = harness.send_message("play a high C").await;

    assert!(reply.starts_with("Code executed successfully"));
    assert_eq!(harness.provider.request_count().await, 2);

    let requests = harness.provider.requests().await;
    let correction = &requests[1].last().unwrap().content;
    assert!(correction.starts_with("play a high C"));
    assert!(correction.contains("Error in previous response"));
}

// ---- Side commands ----

#[tokio::test]
async fn save_writes_first_numbered_file() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![code_reply("play 60")])
        .build()
        .await
        .unwrap();

    harness.send_message("play").await;
    let reply = harness.controller.save_current_code().await;

    let saved = harness.saved_files();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].ends_with("1.pi"));
    assert_eq!(std::fs::read_to_string(&saved[0]).unwrap(), "play 60");
    assert!(reply.starts_with("Code saved to"));
}

#[tokio::test]
async fn save_without_code_writes_nothing() {
    let harness = TestHarness::builder().build().await.unwrap();

    let reply = harness.controller.save_current_code().await;

    assert_eq!(reply, NOTHING_TO_SAVE_MESSAGE);
    assert!(harness.saved_files().is_empty());
}

#[tokio::test]
async fn new_chat_keeps_music_session() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![code_reply("play 60")])
        .build()
        .await
        .unwrap();

    harness.send_message("play").await;
    let session = harness.controller.session().id.clone();

    let reply = harness.controller.new_chat();

    assert_eq!(reply, "New chat started.");
    assert!(harness.controller.history().is_empty());
    assert_eq!(harness.controller.session().id, session);
    assert_eq!(harness.controller.current_code(), "play 60");
    assert_eq!(harness.snapshot_files().len(), 1);
}

#[tokio::test]
async fn replay_reexecutes_snapshots_in_order() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![code_reply("play 60"), code_reply("play 64")])
        .build()
        .await
        .unwrap();

    harness.send_message("one").await;
    harness.send_message("two").await;

    let reply = harness.controller.replay_session().await;

    assert_eq!(reply, "Replayed snapshot 1.\nReplayed snapshot 2.");
    let executed = harness.sink.executed().await;
    assert_eq!(executed[2..], ["play 60".to_string(), "play 64".to_string()]);
}
