// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the controller.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a song session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh, filesystem-safe session identifier.
    ///
    /// Format: `session_<YYYYmmdd_HHMMSS>_<8 hex chars>`. The random suffix
    /// keeps two sessions started within the same second apart.
    pub fn generate() -> Self {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("session_{stamp}_{}", &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Sink,
    Storage,
}

// --- Conversation types ---

/// Role of a message sent to the language model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of a model request: `{role, content}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation history entry.
///
/// Serialized as `{"content": ..., "isUser": ...}`, the shape the web UI reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(rename = "isUser")]
    pub is_from_user: bool,
}

impl Message {
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_from_user: true,
        }
    }

    pub fn from_assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_from_user: false,
        }
    }

    /// Converts the history entry into a model request message.
    pub fn to_chat(&self) -> ChatMessage {
        if self.is_from_user {
            ChatMessage::user(self.content.clone())
        } else {
            ChatMessage::assistant(self.content.clone())
        }
    }
}

// --- Action types ---

/// One directive decoded from a model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sonic Pi code to run.
    GenerateCode { code: String },
    /// Stop all playing music.
    Stop,
    /// Stop, then start a fresh session with no current code.
    NewSong,
    /// Revert the last code change.
    Undo,
    /// Informational reply, no music change.
    UserInquiry { response_text: String },
    /// Any action tag this controller does not recognise.
    Unknown { raw_tag: String },
}

impl Action {
    /// Returns the wire tag this action was decoded from.
    pub fn tag(&self) -> &str {
        match self {
            Action::GenerateCode { .. } => "generate_code",
            Action::Stop => "stop",
            Action::NewSong => "new_song",
            Action::Undo => "undo",
            Action::UserInquiry { .. } => "user_inquiry",
            Action::Unknown { raw_tag } => raw_tag,
        }
    }

    /// True for actions that carry code to execute.
    pub fn is_code(&self) -> bool {
        matches!(self, Action::GenerateCode { .. })
    }
}

// --- Session types ---

/// The active song session: identity plus its snapshot counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    /// Sequence number of the newest snapshot, 0 when none exist.
    pub code_counter: u32,
    /// Directory holding this session's snapshot files.
    pub code_dir: PathBuf,
}

impl Session {
    pub fn new(id: SessionId, code_dir: PathBuf) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            code_counter: 0,
            code_dir,
        }
    }
}

/// An immutable, sequence-numbered copy of one executed code unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSnapshot {
    pub session_id: SessionId,
    pub sequence: u32,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_session_ids_are_unique_and_prefixed() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("session_"));
        // session_ + 15 timestamp chars + _ + 8 hex chars
        assert_eq!(a.as_str().len(), "session_".len() + 15 + 1 + 8);
    }

    #[test]
    fn message_serializes_with_is_user_key() {
        let msg = Message::from_user("play 60");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"content": "play 60", "isUser": true}));
    }

    #[test]
    fn history_entries_map_to_chat_roles() {
        assert_eq!(Message::from_user("a").to_chat().role, ChatRole::User);
        assert_eq!(
            Message::from_assistant("b").to_chat().role,
            ChatRole::Assistant
        );
    }

    #[test]
    fn chat_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("x")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"x"}"#);
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn action_tags_match_wire_names() {
        assert_eq!(Action::GenerateCode { code: "x".into() }.tag(), "generate_code");
        assert_eq!(Action::NewSong.tag(), "new_song");
        assert_eq!(
            Action::Unknown {
                raw_tag: "dance".into()
            }
            .tag(),
            "dance"
        );
        assert!(Action::GenerateCode { code: "x".into() }.is_code());
        assert!(!Action::Stop.is_code());
    }

    #[test]
    fn new_session_starts_with_zero_counter() {
        let session = Session::new(SessionId("session_test".into()), PathBuf::from("/tmp/s"));
        assert_eq!(session.code_counter, 0);
        assert_eq!(session.code_dir, PathBuf::from("/tmp/s"));
    }
}
