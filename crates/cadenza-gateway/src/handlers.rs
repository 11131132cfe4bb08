// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the web UI API.

use axum::{Json, extract::State};
use cadenza_core::Message;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::server::GatewayState;

/// Request body for POST /api/send-message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Response body for POST /api/send-message.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub response: String,
}

/// Response body for the stop, save and new-chat routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub session_id: String,
    pub state: String,
}

/// GET /health
///
/// Never waits for the controller. `state` is `busy` while a request holds
/// it, otherwise the controller's own state.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let controller_state = match state.controller.try_lock() {
        Ok(controller) => controller.state().to_string(),
        Err(_) => "busy".to_string(),
    };
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        session_id: state.view.load().session_id.clone(),
        state: controller_state,
    })
}

/// GET /api/chat-history
///
/// Serves the history as of the last finished request; a turn in flight
/// shows up once it completes.
pub async fn get_chat_history(State(state): State<GatewayState>) -> Json<Vec<Message>> {
    Json(state.view.load().history.clone())
}

/// POST /api/send-message
///
/// Runs one full turn. Failures are part of the reply text, so this always
/// answers 200.
pub async fn post_send_message(
    State(state): State<GatewayState>,
    Json(body): Json<SendMessageRequest>,
) -> Json<SendMessageResponse> {
    debug!(bytes = body.message.len(), "send-message received");
    let mut controller = state.controller.lock().await;
    let response = controller.handle_user_message(&body.message).await;
    state.publish(&controller);
    Json(SendMessageResponse { response })
}

/// POST /api/new-chat
pub async fn post_new_chat(State(state): State<GatewayState>) -> Json<StatusMessage> {
    let mut controller = state.controller.lock().await;
    let message = controller.new_chat();
    state.publish(&controller);
    Json(StatusMessage { message })
}

/// POST /api/stop-music
pub async fn post_stop_music(State(state): State<GatewayState>) -> Json<StatusMessage> {
    let message = state.controller.lock().await.stop_music().await;
    Json(StatusMessage { message })
}

/// POST /api/save-code
pub async fn post_save_code(State(state): State<GatewayState>) -> Json<StatusMessage> {
    let message = state.controller.lock().await.save_current_code().await;
    Json(StatusMessage { message })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use cadenza_agent::SessionController;
    use cadenza_test_utils::{MemorySnapshotStore, MockProvider, MockSink};
    use tower::ServiceExt;

    use crate::server::{GatewayState, build_router};

    use super::*;

    struct Fixture {
        state: GatewayState,
        provider: Arc<MockProvider>,
        sink: Arc<MockSink>,
        store: Arc<MemorySnapshotStore>,
    }

    async fn fixture(responses: Vec<&str>) -> Fixture {
        let provider = Arc::new(MockProvider::with_responses(
            responses.into_iter().map(String::from).collect(),
        ));
        let sink = Arc::new(MockSink::new());
        let store = Arc::new(MemorySnapshotStore::new());
        let controller = SessionController::new(
            provider.clone(),
            sink.clone(),
            store.clone(),
            "system".into(),
            3,
        )
        .await
        .unwrap();
        Fixture {
            state: GatewayState::new(controller),
            provider,
            sink,
            store,
        }
    }

    async fn call(state: &GatewayState, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = build_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn send_message_runs_a_turn() {
        let f = fixture(vec![r#"[{"action":"generate_code","code":"play 60"}]"#]).await;

        let (status, body) = call(
            &f.state,
            post_json("/api/send-message", serde_json::json!({"message": "play"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["response"],
            "Code executed successfully:\n```\nplay 60\n```"
        );
        assert_eq!(f.sink.executed().await, vec!["play 60"]);
    }

    #[tokio::test]
    async fn chat_history_uses_is_user_key() {
        let f = fixture(vec![r#"{"action":"stop"}"#]).await;
        call(
            &f.state,
            post_json("/api/send-message", serde_json::json!({"message": "hush"})),
        )
        .await;

        let (status, body) = call(
            &f.state,
            Request::get("/api/chat-history").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                {"content": "hush", "isUser": true},
                {"content": "{\"action\":\"stop\"}", "isUser": false}
            ])
        );
    }

    #[tokio::test]
    async fn new_chat_clears_history() {
        let f = fixture(vec![r#"{"action":"stop"}"#]).await;
        call(
            &f.state,
            post_json("/api/send-message", serde_json::json!({"message": "hush"})),
        )
        .await;

        let (_, body) = call(&f.state, post_empty("/api/new-chat")).await;
        assert_eq!(body["message"], "New chat started.");

        let (_, history) = call(
            &f.state,
            Request::get("/api/chat-history").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(history, serde_json::json!([]));
    }

    #[tokio::test]
    async fn stop_music_reports_sink_result() {
        let f = fixture(vec![]).await;

        let (_, body) = call(&f.state, post_empty("/api/stop-music")).await;
        assert_eq!(body["message"], "Music stopped.");

        f.sink.set_stop_failure(Some("no server")).await;
        let (_, body) = call(&f.state, post_empty("/api/stop-music")).await;
        assert_eq!(body["message"], "no server");
    }

    #[tokio::test]
    async fn save_code_archives_current_code() {
        let f = fixture(vec![r#"{"action":"generate_code","code":"play 72"}"#]).await;
        call(
            &f.state,
            post_json("/api/send-message", serde_json::json!({"message": "play"})),
        )
        .await;

        let (status, body) = call(&f.state, post_empty("/api/save-code")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(
            body["message"].as_str().unwrap().starts_with("Code saved to "),
            "got: {body}"
        );
        assert_eq!(f.store.archived().await, vec!["play 72"]);
    }

    #[tokio::test]
    async fn health_reports_idle_controller() {
        let f = fixture(vec![]).await;
        let (status, body) = call(
            &f.state,
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["state"], "idle");
        assert!(body["session_id"].as_str().unwrap().starts_with("session_"));
    }

    #[tokio::test]
    async fn health_and_history_answer_during_a_slow_turn() {
        let f = fixture(vec![r#"{"action":"stop"}"#]).await;
        f.provider.set_delay(Duration::from_secs(2));

        let turn_state = f.state.clone();
        let turn = tokio::spawn(async move {
            call(
                &turn_state,
                post_json("/api/send-message", serde_json::json!({"message": "hush"})),
            )
            .await
        });
        while f.provider.request_count().await == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let (status, health) = tokio::time::timeout(
            Duration::from_millis(500),
            call(&f.state, Request::get("/health").body(Body::empty()).unwrap()),
        )
        .await
        .expect("health must not wait for the turn");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["state"], "busy");
        assert!(health["session_id"].as_str().unwrap().starts_with("session_"));

        let (_, history) = tokio::time::timeout(
            Duration::from_millis(500),
            call(
                &f.state,
                Request::get("/api/chat-history").body(Body::empty()).unwrap(),
            ),
        )
        .await
        .expect("history must not wait for the turn");
        assert_eq!(history, serde_json::json!([]));

        let (status, _) = turn.await.unwrap();
        assert_eq!(status, StatusCode::OK);

        let (_, history) = call(
            &f.state,
            Request::get("/api/chat-history").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(history.as_array().unwrap().len(), 2);
        let (_, health) = call(
            &f.state,
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(health["state"], "idle");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let f = fixture(vec![]).await;
        let resp = build_router(f.state.clone())
            .oneshot(post_json("/api/send-message", serde_json::json!({"text": "x"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
