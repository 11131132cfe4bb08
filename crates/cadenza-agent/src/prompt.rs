// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.
//!
//! Priority: `system_prompt_file` > inline `system_prompt` > built-in
//! prompt. An optional example code library is appended after it.

use cadenza_config::model::AgentConfig;
use tracing::{debug, warn};

/// Built-in instructions describing the JSON action protocol.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a seasoned live coder performing with Sonic Pi.
Keep the music playful and inventive, but follow the user's requests as closely as you can.

Every reply is a JSON list of action objects. The available actions are:
1. Run Sonic Pi code: {"action": "generate_code", "code": "<sonic pi code>"}
2. Stop all music: {"action": "stop"}
3. Start a new song: {"action": "new_song"}
4. Undo the last change: {"action": "undo"}
5. Answer a question without changing the music: {"action": "user_inquiry", "response": "<text>"}

Rules:
- Put "new_song" before "generate_code" when starting a completely new piece.
- Without "new_song", generated code is layered on top of what is already playing.
- "Start over" and similar requests mean stop and prepare for a new song; only generate code if asked.
- General questions about music or Sonic Pi get a "user_inquiry" answer.
- Reply with a JSON list even for a single action, and never add text outside the JSON."#;

const EXAMPLES_HEADER: &str = "Here is a library of canonical Sonic Pi example code:";

/// Builds the system prompt for `config`.
///
/// Unreadable prompt or example files are logged and skipped so the
/// controller still starts with the next source in line.
pub async fn load_system_prompt(config: &AgentConfig) -> String {
    let mut prompt = match config.system_prompt_file.as_deref() {
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                debug!(path, "loaded system prompt from file");
                content.trim().to_string()
            }
            Err(e) => {
                warn!(path, error = %e, "could not read system prompt file, falling back");
                inline_or_default(config)
            }
        },
        None => inline_or_default(config),
    };

    if let Some(path) = config.example_code_file.as_deref() {
        match tokio::fs::read_to_string(path).await {
            Ok(examples) if !examples.trim().is_empty() => {
                debug!(path, bytes = examples.len(), "appending example code library");
                prompt = with_examples(&prompt, &examples);
            }
            Ok(_) => debug!(path, "example code file is empty"),
            Err(e) => warn!(path, error = %e, "example code file not found"),
        }
    }

    prompt
}

fn inline_or_default(config: &AgentConfig) -> String {
    config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

fn with_examples(prompt: &str, examples: &str) -> String {
    format!("{prompt}\n\n{EXAMPLES_HEADER}\n\n{}", examples.trim_end())
}
