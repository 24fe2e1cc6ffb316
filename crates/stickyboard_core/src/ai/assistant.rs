//! Board assistant conversation state.
//!
//! # Responsibility
//! - Own the transcript shown in the assistant panel.
//! - Guard against blank input and overlapping requests.
//! - Turn integration failures and rejected replies into the audience's
//!   static apology message.
//!
//! # Invariants
//! - Opening the panel resets the transcript to exactly one welcome message.
//! - At most one request is in flight; `complete_request` always clears it.
//! - No retries.

use super::prompt::build_assistant_request;
use super::suggestion::{parse_assistant_reply, AssistantReply, Suggestion, SuggestionError};
use crate::audience::AudienceMode;
use crate::integration::{IntegrationError, LlmProvider};
use crate::model::board::Board;
use crate::model::note::{Note, NoteId};
use log::{error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub suggestions: Vec<Suggestion>,
}

impl ChatMessage {
    fn user(text: &str) -> Self {
        Self {
            role: ChatRole::User,
            text: text.to_string(),
            suggestions: Vec::new(),
        }
    }

    fn assistant(text: &str) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.to_string(),
            suggestions: Vec::new(),
        }
    }
}

/// Why a request was refused before reaching the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantError {
    EmptyInput,
    Busy,
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "assistant input must not be blank"),
            Self::Busy => write!(f, "assistant is still processing the previous request"),
        }
    }
}

impl Error for AssistantError {}

/// Why an in-flight request produced no usable reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantFailure {
    /// Note context could not be encoded into the prompt.
    Prompt(String),
    Integration(IntegrationError),
    Rejected(SuggestionError),
}

impl AssistantFailure {
    fn code(&self) -> &'static str {
        match self {
            Self::Prompt(_) => "prompt_encode_failed",
            Self::Integration(err) => err.code(),
            Self::Rejected(_) => "reply_rejected",
        }
    }
}

impl Display for AssistantFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prompt(message) => write!(f, "prompt encode failed: {message}"),
            Self::Integration(err) => write!(f, "{err}"),
            Self::Rejected(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssistantFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Prompt(_) => None,
            Self::Integration(err) => Some(err),
            Self::Rejected(err) => Some(err),
        }
    }
}

impl From<IntegrationError> for AssistantFailure {
    fn from(value: IntegrationError) -> Self {
        Self::Integration(value)
    }
}

impl From<SuggestionError> for AssistantFailure {
    fn from(value: SuggestionError) -> Self {
        Self::Rejected(value)
    }
}

#[derive(Debug, Clone)]
pub struct AiAssistant {
    audience: AudienceMode,
    messages: Vec<ChatMessage>,
    processing: bool,
}

impl AiAssistant {
    pub fn new(audience: AudienceMode) -> Self {
        let mut assistant = Self {
            audience,
            messages: Vec::new(),
            processing: false,
        };
        assistant.open(audience);
        assistant
    }

    /// Resets the transcript to the audience welcome message.
    pub fn open(&mut self, audience: AudienceMode) {
        self.audience = audience;
        self.messages = vec![ChatMessage::assistant(audience.profile().welcome_message)];
    }

    pub fn audience(&self) -> AudienceMode {
        self.audience
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Records the user's message and marks a request as in flight.
    pub fn begin_request(&mut self, input: &str) -> Result<(), AssistantError> {
        if input.trim().is_empty() {
            return Err(AssistantError::EmptyInput);
        }
        if self.processing {
            return Err(AssistantError::Busy);
        }
        self.messages.push(ChatMessage::user(input));
        self.processing = true;
        Ok(())
    }

    /// Appends the reply, or the apology on failure, and clears the
    /// in-flight flag.
    pub fn complete_request(
        &mut self,
        outcome: Result<AssistantReply, AssistantFailure>,
    ) -> &ChatMessage {
        self.processing = false;
        let message = match outcome {
            Ok(reply) => ChatMessage {
                role: ChatRole::Assistant,
                text: reply.response_text,
                suggestions: reply.suggestions,
            },
            Err(failure) => {
                error!(
                    "event=ai_request module=ai status=error error_code={} error={}",
                    failure.code(),
                    failure
                );
                ChatMessage::assistant(self.audience.profile().apology_message)
            }
        };
        let index = self.messages.len();
        self.messages.push(message);
        &self.messages[index]
    }

    /// Runs one full request against `llm` using `notes` as context.
    pub fn send(
        &mut self,
        input: &str,
        notes: &[Note],
        boards: &[Board],
        llm: &dyn LlmProvider,
    ) -> Result<&ChatMessage, AssistantError> {
        self.begin_request(input)?;
        let started_at = Instant::now();
        info!(
            "event=ai_request module=ai status=start audience={} note_count={}",
            self.audience.as_str(),
            notes.len()
        );

        let known: HashSet<NoteId> = notes.iter().map(|note| note.id).collect();
        let outcome = build_assistant_request(self.audience.profile(), notes, boards, input)
            .map_err(|err| AssistantFailure::Prompt(err.to_string()))
            .and_then(|request| llm.invoke(&request).map_err(AssistantFailure::from))
            .and_then(|response| {
                parse_assistant_reply(response, &known).map_err(AssistantFailure::from)
            });

        if let Ok(reply) = &outcome {
            info!(
                "event=ai_request module=ai status=ok duration_ms={} suggestion_count={}",
                started_at.elapsed().as_millis(),
                reply.suggestions.len()
            );
        }
        Ok(self.complete_request(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::{AiAssistant, AssistantError, ChatRole};
    use crate::audience::AudienceMode;
    use crate::integration::{IntegrationError, LlmResponse, ScriptedLlm};
    use serde_json::json;

    #[test]
    fn open_resets_to_welcome_message() {
        let mut assistant = AiAssistant::new(AudienceMode::Professional);
        assistant.begin_request("hello").unwrap();
        assistant.open(AudienceMode::Student);

        assert_eq!(assistant.messages().len(), 1);
        assert_eq!(
            assistant.messages()[0].text,
            AudienceMode::Student.profile().welcome_message
        );
    }

    #[test]
    fn refuses_blank_and_overlapping_requests() {
        let mut assistant = AiAssistant::new(AudienceMode::Professional);
        assert_eq!(assistant.begin_request("   "), Err(AssistantError::EmptyInput));
        assistant.begin_request("first").unwrap();
        assert_eq!(assistant.begin_request("second"), Err(AssistantError::Busy));
        assert!(assistant.is_processing());
    }

    #[test]
    fn integration_failure_appends_apology() {
        let llm = ScriptedLlm::new([Err(IntegrationError::Unavailable("offline".to_string()))]);
        let mut assistant = AiAssistant::new(AudienceMode::Professional);

        let reply = assistant.send("help", &[], &[], &llm).unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.text, AudienceMode::Professional.profile().apology_message);
        assert!(!assistant.is_processing());
        assert_eq!(assistant.messages().len(), 3);
    }

    #[test]
    fn malformed_reply_appends_apology() {
        let llm = ScriptedLlm::new([Ok(LlmResponse::Structured(json!({ "text": 1 })))]);
        let mut assistant = AiAssistant::new(AudienceMode::Student);

        let reply = assistant.send("help", &[], &[], &llm).unwrap();
        assert_eq!(reply.text, AudienceMode::Student.profile().apology_message);
    }
}
