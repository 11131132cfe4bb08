// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parse boundary between free-text model replies and typed [`Action`]s.
//!
//! Accepted shapes are a JSON object or a JSON array of objects. Entries
//! without an `action` key are dropped; unrecognised tags become
//! [`Action::Unknown`] so new directives degrade gracefully. Recognised
//! actions missing a required field reject the whole reply.

use cadenza_core::{Action, ParseError};
use serde_json::{Map, Value};
use tracing::debug;

/// Parses one raw model reply into an ordered list of actions.
pub fn parse_actions(raw: &str) -> Result<Vec<Action>, ParseError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::Syntax(e.to_string()))?;

    let entries = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(ParseError::Syntax(format!(
                "expected a JSON object or an array of objects, found {}",
                json_kind(&other)
            )));
        }
    };

    let mut actions = Vec::with_capacity(entries.len());
    for entry in &entries {
        match entry {
            Value::Object(fields) => {
                if let Some(action) = parse_entry(fields)? {
                    actions.push(action);
                }
            }
            other => debug!(kind = json_kind(other), "dropping non-object entry"),
        }
    }

    Ok(actions)
}

/// Decodes one object. `Ok(None)` means the entry carries no `action` key.
fn parse_entry(fields: &Map<String, Value>) -> Result<Option<Action>, ParseError> {
    let Some(tag) = fields.get("action") else {
        debug!("dropping entry without an action key");
        return Ok(None);
    };

    let Some(tag) = tag.as_str() else {
        return Ok(Some(Action::Unknown {
            raw_tag: tag.to_string(),
        }));
    };

    let action = match tag {
        "generate_code" => Action::GenerateCode {
            code: required_str(fields, "generate_code", "code")?,
        },
        "stop" => Action::Stop,
        "new_song" => Action::NewSong,
        "undo" => Action::Undo,
        "user_inquiry" => Action::UserInquiry {
            response_text: required_str(fields, "user_inquiry", "response")?,
        },
        other => Action::Unknown {
            raw_tag: other.to_string(),
        },
    };

    Ok(Some(action))
}

fn required_str(
    fields: &Map<String, Value>,
    action: &'static str,
    field: &'static str,
) -> Result<String, ParseError> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ParseError::MissingField { action, field })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_object_is_normalized_to_list() {
        let actions = parse_actions(r#"{"action":"stop"}"#).unwrap();
        assert_eq!(actions, vec![Action::Stop]);
    }

    #[test]
    fn array_preserves_order() {
        let raw = r#"[
            {"action":"new_song"},
            {"action":"generate_code","code":"play 60"},
            {"action":"undo"}
        ]"#;
        let actions = parse_actions(raw).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::NewSong,
                Action::GenerateCode {
                    code: "play 60".into()
                },
                Action::Undo,
            ]
        );
    }

    #[test]
    fn entries_without_action_are_dropped() {
        let raw = r#"[{"code":"play 60"}, {"action":"stop"}, 42, "text"]"#;
        assert_eq!(parse_actions(raw).unwrap(), vec![Action::Stop]);
    }

    #[test]
    fn unknown_tag_is_kept_not_rejected() {
        let actions = parse_actions(r#"{"action":"error","message":"oops"}"#).unwrap();
        assert_eq!(
            actions,
            vec![Action::Unknown {
                raw_tag: "error".into()
            }]
        );
    }

    #[test]
    fn non_string_tag_becomes_unknown() {
        let actions = parse_actions(r#"{"action": 7}"#).unwrap();
        assert_eq!(actions, vec![Action::Unknown { raw_tag: "7".into() }]);
    }

    #[test]
    fn generate_code_without_code_is_missing_field() {
        let err = parse_actions(r#"[{"action":"stop"},{"action":"generate_code"}]"#).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                action: "generate_code",
                field: "code"
            }
        );
    }

    #[test]
    fn non_string_code_is_missing_field() {
        let err = parse_actions(r#"{"action":"generate_code","code":12}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "code", .. }));
    }

    #[test]
    fn user_inquiry_requires_response() {
        let err = parse_actions(r#"{"action":"user_inquiry"}"#).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                action: "user_inquiry",
                field: "response"
            }
        );

        let ok = parse_actions(
            r#"{"action":"user_inquiry","response":"Sonic Pi uses Ruby-like syntax"}"#,
        )
        .unwrap();
        assert_eq!(
            ok,
            vec![Action::UserInquiry {
                response_text: "Sonic Pi uses Ruby-like syntax".into()
            }]
        );
    }

    #[test]
    fn plain_text_is_syntax_error() {
        assert!(matches!(parse_actions("not json"), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn scalar_top_level_is_syntax_error() {
        let err = parse_actions("\"stop\"").unwrap_err();
        match err {
            ParseError::Syntax(detail) => assert!(detail.contains("a string"), "got: {detail}"),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn empty_array_yields_no_actions() {
        assert!(parse_actions("[]").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn generated_code_round_trips_verbatim(codes in prop::collection::vec(".*", 0..5)) {
            let raw = serde_json::Value::Array(
                codes
                    .iter()
                    .map(|c| serde_json::json!({"action": "generate_code", "code": c}))
                    .collect(),
            )
            .to_string();

            let parsed = parse_actions(&raw).unwrap();
            let expected: Vec<Action> = codes
                .into_iter()
                .map(|code| Action::GenerateCode { code })
                .collect();
            prop_assert_eq!(parsed, expected);
        }

        #[test]
        fn arbitrary_text_never_panics(raw in ".*") {
            let _ = parse_actions(&raw);
        }
    }
}
