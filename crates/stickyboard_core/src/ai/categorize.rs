//! Note categorization: keyword heuristics for bulk runs and an LLM call for
//! the single-note editor.

use super::prompt::{build_category_request, category_response_schema};
use super::suggestion::{validate_against_schema, SuggestionError};
use crate::audience::AudienceMode;
use crate::integration::{IntegrationError, LlmProvider, LlmResponse};
use crate::model::note::{Note, NoteId, NotePatch, Priority};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One proposed re-classification, shown before the user applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySuggestion {
    pub note_id: NoteId,
    pub title: String,
    pub original_category: Option<String>,
    pub original_priority: Priority,
    pub category: String,
    pub priority: Priority,
    pub tags: Vec<String>,
}

impl CategorySuggestion {
    pub fn to_patch(&self) -> NotePatch {
        NotePatch {
            category: Some(Some(self.category.clone())),
            priority: Some(self.priority),
            tags: Some(self.tags.clone()),
            ..NotePatch::default()
        }
    }
}

struct KeywordRule {
    keywords: &'static [&'static str],
    category: &'static str,
    tags: &'static [&'static str],
}

struct PriorityRule {
    keywords: &'static [&'static str],
    priority: Priority,
}

const PROFESSIONAL_CATEGORY_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["meeting", "call", "discuss"],
        category: "meetings",
        tags: &["Meeting", "Discussion"],
    },
    KeywordRule {
        keywords: &["project", "development", "build"],
        category: "projects",
        tags: &["Project", "Development"],
    },
    KeywordRule {
        keywords: &["idea", "brainstorm", "concept"],
        category: "ideas",
        tags: &["Idea", "Innovation"],
    },
    KeywordRule {
        keywords: &["task", "todo", "action"],
        category: "todo",
        tags: &["Task", "Action Item"],
    },
];

const PROFESSIONAL_FALLBACK: (&str, &[&str]) = ("work", &["Work", "Business"]);

const PROFESSIONAL_PRIORITY_RULES: &[PriorityRule] = &[
    PriorityRule {
        keywords: &["urgent", "asap", "critical"],
        priority: Priority::Urgent,
    },
    PriorityRule {
        keywords: &["important", "priority", "deadline"],
        priority: Priority::High,
    },
    PriorityRule {
        keywords: &["moderate", "normal"],
        priority: Priority::Medium,
    },
];

const STUDENT_CATEGORY_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["homework", "assignment", "essay"],
        category: "assignment",
        tags: &["Study"],
    },
    KeywordRule {
        keywords: &["exam", "test", "quiz", "revise"],
        category: "exam_prep",
        tags: &["Exam"],
    },
    KeywordRule {
        keywords: &["research", "project", "experiment"],
        category: "project_research",
        tags: &["Research"],
    },
    KeywordRule {
        keywords: &["read", "book", "chapter"],
        category: "reading_list",
        tags: &["Reading"],
    },
    KeywordRule {
        keywords: &["remind", "remember", "don't forget"],
        category: "reminder",
        tags: &["Important"],
    },
];

const STUDENT_FALLBACK: (&str, &[&str]) = ("subject_notes", &["School"]);

const STUDENT_PRIORITY_RULES: &[PriorityRule] = &[
    PriorityRule {
        keywords: &["urgent", "due tomorrow", "test"],
        priority: Priority::Urgent,
    },
    PriorityRule {
        keywords: &["important", "exam", "project"],
        priority: Priority::High,
    },
    PriorityRule {
        keywords: &["soon", "this week"],
        priority: Priority::Medium,
    },
];

/// Keyword-based suggestion over the note's title and content.
///
/// First matching rule wins; unmatched notes get the audience fallback
/// category and `low` priority.
pub fn categorize_heuristic(note: &Note, audience: AudienceMode) -> CategorySuggestion {
    let text = format!("{} {}", note.title, note.content).to_lowercase();
    let (category_rules, fallback, priority_rules) = match audience {
        AudienceMode::Professional => (
            PROFESSIONAL_CATEGORY_RULES,
            PROFESSIONAL_FALLBACK,
            PROFESSIONAL_PRIORITY_RULES,
        ),
        AudienceMode::Student => (STUDENT_CATEGORY_RULES, STUDENT_FALLBACK, STUDENT_PRIORITY_RULES),
    };

    let (category, tags) = category_rules
        .iter()
        .find(|rule| contains_any(&text, rule.keywords))
        .map_or(fallback, |rule| (rule.category, rule.tags));
    let priority = priority_rules
        .iter()
        .find(|rule| contains_any(&text, rule.keywords))
        .map_or(Priority::Low, |rule| rule.priority);

    CategorySuggestion {
        note_id: note.id,
        title: note.title.clone(),
        original_category: note.category.clone(),
        original_priority: note.priority,
        category: category.to_string(),
        priority,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

pub fn categorize_notes(notes: &[Note], audience: AudienceMode) -> Vec<CategorySuggestion> {
    notes
        .iter()
        .map(|note| categorize_heuristic(note, audience))
        .collect()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategorizeError {
    EmptyNote,
    Integration(IntegrationError),
    InvalidReply(SuggestionError),
}

impl Display for CategorizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "note has no title or content to categorize"),
            Self::Integration(err) => write!(f, "{err}"),
            Self::InvalidReply(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategorizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyNote => None,
            Self::Integration(err) => Some(err),
            Self::InvalidReply(err) => Some(err),
        }
    }
}

impl From<IntegrationError> for CategorizeError {
    fn from(value: IntegrationError) -> Self {
        Self::Integration(value)
    }
}

impl From<SuggestionError> for CategorizeError {
    fn from(value: SuggestionError) -> Self {
        Self::InvalidReply(value)
    }
}

/// Asks the LLM for the single best audience category of a draft note.
pub fn categorize_with_llm(
    llm: &dyn LlmProvider,
    audience: AudienceMode,
    title: &str,
    content: &str,
) -> Result<String, CategorizeError> {
    if title.trim().is_empty() && content.trim().is_empty() {
        return Err(CategorizeError::EmptyNote);
    }

    let profile = audience.profile();
    let request = build_category_request(profile, title, content);
    let result = llm
        .invoke(&request)
        .map_err(CategorizeError::from)
        .and_then(|response| {
            let value = match response {
                LlmResponse::Structured(value) => value,
                LlmResponse::Text(text) => serde_json::Value::String(text),
            };
            validate_against_schema(&value, &category_response_schema(&profile.category_values()))?;
            // The schema requires `category` to be one of the enum strings.
            Ok(value
                .get("category")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(profile.default_category)
                .to_string())
        });

    match &result {
        Ok(category) => info!(
            "event=ai_categorize module=ai status=ok audience={} category={category}",
            audience.as_str()
        ),
        Err(err) => error!("event=ai_categorize module=ai status=error error={err}"),
    }
    result
}
