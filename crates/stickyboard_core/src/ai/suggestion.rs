//! Boundary validation of assistant replies into typed suggestions.
//!
//! # Responsibility
//! - Check structured replies against the response schema.
//! - Convert accepted replies into `Suggestion` values with typed patches.
//!
//! # Invariants
//! - A structurally malformed reply is rejected as a whole.
//! - Suggestions naming notes outside the supplied context are dropped
//!   (logged), never applied.
//! - `Update` always carries a non-empty patch.

use super::prompt::assistant_response_schema;
use crate::integration::LlmResponse;
use crate::model::note::{NoteColor, NoteId, NotePatch, NoteStatus, Priority};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Suggestion {
    Update {
        note_id: NoteId,
        changes: NotePatch,
        reason: String,
    },
    Archive {
        note_id: NoteId,
        reason: String,
    },
    Delete {
        note_id: NoteId,
        reason: String,
    },
}

impl Suggestion {
    pub fn note_id(&self) -> NoteId {
        match self {
            Self::Update { note_id, .. }
            | Self::Archive { note_id, .. }
            | Self::Delete { note_id, .. } => *note_id,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Update { reason, .. }
            | Self::Archive { reason, .. }
            | Self::Delete { reason, .. } => reason,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::Archive { .. } => "archive",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Accepted assistant reply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssistantReply {
    pub response_text: String,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionError {
    SchemaCompile(String),
    /// Reply did not match the response schema; one entry per violation.
    Schema(Vec<String>),
    InvalidNoteId(String),
    MissingChanges(NoteId),
    EmptyChanges(NoteId),
    UnsupportedField(String),
    InvalidFieldValue { field: String, expected: &'static str },
}

impl Display for SuggestionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaCompile(message) => {
                write!(f, "response schema failed to compile: {message}")
            }
            Self::Schema(errors) => write!(f, "reply did not match schema: {}", errors.join("; ")),
            Self::InvalidNoteId(value) => write!(f, "invalid note id `{value}`"),
            Self::MissingChanges(id) => write!(f, "update for note {id} has no changes"),
            Self::EmptyChanges(id) => write!(f, "update for note {id} has an empty changes object"),
            Self::UnsupportedField(field) => write!(f, "unsupported note field `{field}`"),
            Self::InvalidFieldValue { field, expected } => {
                write!(f, "field `{field}` must be {expected}")
            }
        }
    }
}

impl Error for SuggestionError {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawAction {
    Update,
    Archive,
    Delete,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    action: RawAction,
    #[serde(rename = "noteId")]
    note_id: String,
    #[serde(default)]
    changes: Option<Map<String, Value>>,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(rename = "responseText")]
    response_text: String,
    #[serde(default)]
    suggestions: Vec<RawSuggestion>,
}

/// Validates `value` against `schema`, collecting every violation.
pub(crate) fn validate_against_schema(
    value: &Value,
    schema: &Value,
) -> Result<(), SuggestionError> {
    let compiled = jsonschema::JSONSchema::compile(schema)
        .map_err(|error| SuggestionError::SchemaCompile(error.to_string()))?;

    let errors: Vec<String> = compiled
        .validate(value)
        .err()
        .map(|errors| {
            errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{path}: {error}")
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SuggestionError::Schema(errors))
    }
}

/// Turns an LLM reply into an `AssistantReply`.
///
/// Plain-text replies become a message without suggestions.
pub fn parse_assistant_reply(
    response: LlmResponse,
    known_notes: &HashSet<NoteId>,
) -> Result<AssistantReply, SuggestionError> {
    let value = match response {
        LlmResponse::Text(text) => {
            return Ok(AssistantReply {
                response_text: text,
                suggestions: Vec::new(),
            })
        }
        LlmResponse::Structured(Value::String(text)) => {
            return Ok(AssistantReply {
                response_text: text,
                suggestions: Vec::new(),
            })
        }
        LlmResponse::Structured(value) => value,
    };

    validate_against_schema(&value, &assistant_response_schema())?;
    let raw: RawReply = serde_json::from_value(value)
        .map_err(|error| SuggestionError::Schema(vec![error.to_string()]))?;

    let mut suggestions = Vec::with_capacity(raw.suggestions.len());
    for raw_suggestion in raw.suggestions {
        let suggestion = convert_suggestion(raw_suggestion)?;
        if !known_notes.contains(&suggestion.note_id()) {
            warn!(
                "event=ai_suggestion module=ai status=skipped action={} error_code=unknown_note",
                suggestion.action()
            );
            continue;
        }
        suggestions.push(suggestion);
    }

    Ok(AssistantReply {
        response_text: raw.response_text,
        suggestions,
    })
}

fn convert_suggestion(raw: RawSuggestion) -> Result<Suggestion, SuggestionError> {
    let note_id = Uuid::parse_str(raw.note_id.trim())
        .map_err(|_| SuggestionError::InvalidNoteId(raw.note_id.clone()))?;
    let reason = raw.reason;

    match raw.action {
        RawAction::Archive => Ok(Suggestion::Archive { note_id, reason }),
        RawAction::Delete => Ok(Suggestion::Delete { note_id, reason }),
        RawAction::Update => {
            let changes = raw.changes.ok_or(SuggestionError::MissingChanges(note_id))?;
            if changes.is_empty() {
                return Err(SuggestionError::EmptyChanges(note_id));
            }
            Ok(Suggestion::Update {
                note_id,
                changes: patch_from_changes(&changes)?,
                reason,
            })
        }
    }
}

/// Maps a `changes` object onto a typed note patch.
pub fn patch_from_changes(changes: &Map<String, Value>) -> Result<NotePatch, SuggestionError> {
    let mut patch = NotePatch::default();
    for (field, value) in changes {
        match field.as_str() {
            "title" => patch.title = Some(required_string(field, value)?),
            "content" => patch.content = Some(required_string(field, value)?),
            "color" => {
                let raw = required_string(field, value)?;
                patch.color = Some(
                    NoteColor::parse(&raw).ok_or_else(|| invalid(field, "a palette color"))?,
                );
            }
            "priority" => {
                let raw = required_string(field, value)?;
                patch.priority = Some(
                    Priority::parse(&raw)
                        .ok_or_else(|| invalid(field, "urgent, high, medium or low"))?,
                );
            }
            "status" => {
                let raw = required_string(field, value)?;
                patch.status =
                    Some(NoteStatus::parse(&raw).ok_or_else(|| invalid(field, "a note status"))?);
            }
            "category" => patch.category = Some(nullable_string(field, value)?),
            "project" => patch.project = Some(nullable_string(field, value)?),
            "assigned_to" => patch.assigned_to = Some(nullable_string(field, value)?),
            "note_type" => patch.note_type = Some(nullable_string(field, value)?),
            "due_date" => {
                let raw = nullable_string(field, value)?;
                let parsed = raw
                    .map(|text| {
                        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                            .map_err(|_| invalid(field, "a YYYY-MM-DD date or null"))
                    })
                    .transpose()?;
                patch.due_date = Some(parsed);
            }
            "is_archived" => {
                patch.is_archived =
                    Some(value.as_bool().ok_or_else(|| invalid(field, "a boolean"))?);
            }
            "tags" => {
                let items = value
                    .as_array()
                    .ok_or_else(|| invalid(field, "an array of strings"))?;
                let tags = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| invalid(field, "an array of strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                patch.tags = Some(tags);
            }
            _ => return Err(SuggestionError::UnsupportedField(field.clone())),
        }
    }
    Ok(patch)
}

fn required_string(field: &str, value: &Value) -> Result<String, SuggestionError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(field, "a string"))
}

fn nullable_string(field: &str, value: &Value) -> Result<Option<String>, SuggestionError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(invalid(field, "a string or null")),
    }
}

fn invalid(field: &str, expected: &'static str) -> SuggestionError {
    SuggestionError::InvalidFieldValue {
        field: field.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_assistant_reply, patch_from_changes, Suggestion, SuggestionError};
    use crate::integration::LlmResponse;
    use crate::model::note::Priority;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn plain_text_reply_has_no_suggestions() {
        let reply =
            parse_assistant_reply(LlmResponse::Text("hi".to_string()), &HashSet::new()).unwrap();
        assert_eq!(reply.response_text, "hi");
        assert!(reply.suggestions.is_empty());
    }

    #[test]
    fn unknown_action_is_rejected_by_schema() {
        let id = Uuid::new_v4();
        let value = json!({
            "responseText": "ok",
            "suggestions": [{ "action": "merge", "noteId": id.to_string(), "reason": "dup" }]
        });
        let err = parse_assistant_reply(LlmResponse::Structured(value), &HashSet::from([id]))
            .unwrap_err();
        assert!(matches!(err, SuggestionError::Schema(_)));
    }

    #[test]
    fn missing_response_text_is_rejected() {
        let err = parse_assistant_reply(
            LlmResponse::Structured(json!({ "suggestions": [] })),
            &HashSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SuggestionError::Schema(_)));
    }

    #[test]
    fn update_converts_changes_into_patch() {
        let id = Uuid::new_v4();
        let value = json!({
            "responseText": "Bumped it.",
            "suggestions": [{
                "action": "update",
                "noteId": id.to_string(),
                "changes": { "priority": "urgent", "due_date": "2024-02-01", "project": null },
                "reason": "deadline"
            }]
        });
        let reply =
            parse_assistant_reply(LlmResponse::Structured(value), &HashSet::from([id])).unwrap();

        let Suggestion::Update { changes, .. } = &reply.suggestions[0] else {
            panic!("expected update suggestion");
        };
        assert_eq!(changes.priority, Some(Priority::Urgent));
        assert_eq!(changes.due_date, Some(NaiveDate::from_ymd_opt(2024, 2, 1)));
        assert_eq!(changes.project, Some(None));
    }

    #[test]
    fn update_without_changes_is_rejected() {
        let id = Uuid::new_v4();
        let value = json!({
            "responseText": "x",
            "suggestions": [{ "action": "update", "noteId": id.to_string(), "changes": null, "reason": "r" }]
        });
        let err = parse_assistant_reply(LlmResponse::Structured(value), &HashSet::from([id]))
            .unwrap_err();
        assert_eq!(err, SuggestionError::MissingChanges(id));
    }

    #[test]
    fn suggestions_for_unknown_notes_are_dropped() {
        let known = Uuid::new_v4();
        let value = json!({
            "responseText": "x",
            "suggestions": [
                { "action": "archive", "noteId": known.to_string(), "reason": "done" },
                { "action": "delete", "noteId": Uuid::new_v4().to_string(), "reason": "dup" }
            ]
        });
        let reply =
            parse_assistant_reply(LlmResponse::Structured(value), &HashSet::from([known]))
                .unwrap();
        assert_eq!(reply.suggestions.len(), 1);
        assert_eq!(reply.suggestions[0].note_id(), known);
    }

    #[test]
    fn wrongly_typed_change_is_rejected() {
        let changes = json!({ "priority": 3 });
        let err = patch_from_changes(changes.as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            SuggestionError::InvalidFieldValue { field, .. } if field == "priority"
        ));

        let changes = json!({ "position_x": 10 });
        let err = patch_from_changes(changes.as_object().unwrap()).unwrap_err();
        assert_eq!(err, SuggestionError::UnsupportedField("position_x".to_string()));
    }
}
