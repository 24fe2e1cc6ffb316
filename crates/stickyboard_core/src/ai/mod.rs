//! AI assistant glue.
//!
//! # Responsibility
//! - Build LLM prompts from board notes and the active audience profile.
//! - Validate structured replies and turn them into applicable suggestions.
//! - Offer heuristic and LLM-backed note categorization.
//!
//! # Invariants
//! - Nothing in this module mutates notes; callers apply suggestions
//!   through the note service.

pub mod assistant;
pub mod categorize;
pub mod prompt;
pub mod suggestion;

pub use assistant::{AiAssistant, AssistantError, AssistantFailure, ChatMessage, ChatRole};
pub use categorize::{
    categorize_heuristic, categorize_notes, categorize_with_llm, CategorizeError,
    CategorySuggestion,
};
pub use prompt::{
    assistant_response_schema, build_assistant_request, build_category_request, strip_html,
    NoteContext,
};
pub use suggestion::{
    parse_assistant_reply, patch_from_changes, AssistantReply, Suggestion, SuggestionError,
};
