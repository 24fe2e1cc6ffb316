//! Prompt assembly for the board assistant and single-note categorization.
//!
//! # Invariants
//! - Note content is reduced to plain text and capped at
//!   `CONTEXT_CONTENT_CHARS` characters before it enters a prompt.
//! - The response schema handed to the LLM is the same schema replies are
//!   validated against.

use crate::audience::AudienceProfile;
use crate::integration::LlmRequest;
use crate::model::board::Board;
use crate::model::note::{Note, NoteStatus, Priority};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

pub const CONTEXT_CONTENT_CHARS: usize = 100;
pub const UNKNOWN_BOARD_NAME: &str = "Unknown";

const ACTION_INSTRUCTIONS: &str = "Provide a conversational response. If applicable, provide actionable suggestions.
Possible actions are 'update', 'archive', or 'delete'.
For duplicates, suggest archiving or deleting one of the notes.
For updates, provide the 'changes' object. For archive or delete, 'changes' can be null.
Always mention which board a note is on if you refer to it.";

static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>?").expect("html tag regex must compile"));

/// Snapshot of one note as the assistant sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteContext {
    pub id: String,
    pub board_name: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub priority: Priority,
    pub status: NoteStatus,
}

impl NoteContext {
    pub fn from_note(note: &Note, boards: &[Board]) -> Self {
        let board_name = boards
            .iter()
            .find(|board| board.id == note.board_id)
            .map_or(UNKNOWN_BOARD_NAME, |board| board.name.as_str());
        Self {
            id: note.id.to_string(),
            board_name: board_name.to_string(),
            title: note.title.clone(),
            content: strip_html(&note.content)
                .chars()
                .take(CONTEXT_CONTENT_CHARS)
                .collect(),
            category: note.category.clone(),
            priority: note.priority,
            status: note.status,
        }
    }
}

/// Replaces every markup tag with a single space.
pub fn strip_html(value: &str) -> String {
    HTML_TAG_RE.replace_all(value, " ").into_owned()
}

/// Schema of a structured assistant reply.
pub fn assistant_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "responseText": {
                "type": "string",
                "description": "A friendly, conversational response to the user's prompt."
            },
            "suggestions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "action": {
                            "type": "string",
                            "enum": ["update", "archive", "delete"],
                            "description": "The action to perform."
                        },
                        "noteId": { "type": "string" },
                        "changes": {
                            "type": ["object", "null"],
                            "description": "Key-value pairs of properties to update. Null for non-update actions."
                        },
                        "reason": {
                            "type": "string",
                            "description": "Why you are suggesting this change."
                        }
                    },
                    "required": ["action", "noteId", "reason"]
                }
            }
        },
        "required": ["responseText"]
    })
}

/// Builds the board assistant request over every note in `notes`.
///
/// # Errors
/// - Returns the encoder error when the note context cannot be serialized.
pub fn build_assistant_request(
    profile: &AudienceProfile,
    notes: &[Note],
    boards: &[Board],
    user_request: &str,
) -> Result<LlmRequest, serde_json::Error> {
    let context: Vec<NoteContext> = notes
        .iter()
        .map(|note| NoteContext::from_note(note, boards))
        .collect();
    let context_json = serde_json::to_string_pretty(&context)?;

    let prompt = format!(
        "{system}\n\n{heading}\n{context_json}\n\n{label}: \"{user_request}\"\n\n{ACTION_INSTRUCTIONS}",
        system = profile.system_prompt,
        heading = profile.notes_heading,
        label = profile.request_label,
    );
    Ok(LlmRequest::structured(prompt, assistant_response_schema()))
}

/// Schema for single-note categorization constrained to `categories`.
pub fn category_response_schema(categories: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": {
            "category": {
                "type": "string",
                "enum": categories,
                "description": "The most fitting category for the note."
            }
        },
        "required": ["category"]
    })
}

pub fn build_category_request(profile: &AudienceProfile, title: &str, content: &str) -> LlmRequest {
    let categories = profile.category_values();
    let prompt = format!(
        "Analyze the following note's title and content and determine the most appropriate category from the provided list.\n\nCategories: {}.\n\nNote Title: \"{title}\"\nNote Content: \"{}\"\n\nReturn only the single best category.",
        categories.join(", "),
        strip_html(content),
    );
    LlmRequest::structured(prompt, category_response_schema(&categories))
}
