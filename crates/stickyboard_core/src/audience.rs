//! Audience presets (professional vs student).
//!
//! # Responsibility
//! - Hold every piece of audience-dependent copy and vocabulary in one
//!   static lookup keyed by `AudienceMode`.
//!
//! # Invariants
//! - Profiles are immutable `'static` data; callers never branch on the mode
//!   for copy, they read the profile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceMode {
    #[default]
    Professional,
    Student,
}

impl AudienceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Student => "student",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "professional" => Some(Self::Professional),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    pub fn profile(self) -> &'static AudienceProfile {
        match self {
            Self::Professional => &PROFESSIONAL,
            Self::Student => &STUDENT,
        }
    }
}

/// Selectable category with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Quadrant headings for one 2x2 matrix, in classifier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantTitles {
    pub first: &'static str,
    pub second: &'static str,
    pub third: &'static str,
    pub fourth: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AudienceProfile {
    pub mode: AudienceMode,
    pub assistant_title: &'static str,
    pub assistant_subtitle: &'static str,
    pub input_placeholder: &'static str,
    pub processing_text: &'static str,
    pub welcome_message: &'static str,
    pub apology_message: &'static str,
    /// Opening paragraph of the assistant prompt.
    pub system_prompt: &'static str,
    /// Heading of the notes snapshot inside the prompt.
    pub notes_heading: &'static str,
    /// Label in front of the quoted user request.
    pub request_label: &'static str,
    pub quick_prompts: &'static [&'static str],
    pub new_note_label: &'static str,
    pub search_placeholder: &'static str,
    pub categories: &'static [CategoryOption],
    pub default_category: &'static str,
    pub default_note_type: &'static str,
    /// do / decide / delegate / delete.
    pub eisenhower: QuadrantTitles,
    /// quick wins / major projects / fill-ins / thankless tasks.
    pub decision: QuadrantTitles,
}

impl AudienceProfile {
    pub fn category_values(&self) -> Vec<&'static str> {
        self.categories.iter().map(|option| option.value).collect()
    }

    pub fn has_category(&self, value: &str) -> bool {
        self.categories.iter().any(|option| option.value == value)
    }
}

static PROFESSIONAL: AudienceProfile = AudienceProfile {
    mode: AudienceMode::Professional,
    assistant_title: "AI Board Assistant",
    assistant_subtitle: "Your cross-board productivity partner",
    input_placeholder: "Ask the AI about anything on your boards...",
    processing_text: "Thinking across all boards...",
    welcome_message: "Hello! I'm your AI Board Assistant. I can see all your boards and help you organize your work. How can I help?",
    apology_message: "Sorry, I had trouble connecting. Please try again.",
    system_prompt: "You are a helpful AI assistant for a sticky note app.",
    notes_heading: "Here are the current notes across all boards:",
    request_label: "User request",
    quick_prompts: &[
        "Summarize all my boards",
        "What are my top 3 urgent tasks?",
        "Find duplicate notes",
        "Suggest categories for uncategorized notes",
    ],
    new_note_label: "New Note",
    search_placeholder: "Search notes...",
    categories: &[
        CategoryOption { value: "work", label: "Work" },
        CategoryOption { value: "personal", label: "Personal" },
        CategoryOption { value: "ideas", label: "Ideas" },
        CategoryOption { value: "todo", label: "To-Do" },
        CategoryOption { value: "meetings", label: "Meetings" },
        CategoryOption { value: "projects", label: "Projects" },
        CategoryOption { value: "references", label: "References" },
    ],
    default_category: "work",
    default_note_type: "task",
    eisenhower: QuadrantTitles {
        first: "DO (Urgent + Important)",
        second: "DECIDE (Not Urgent + Important)",
        third: "DELEGATE (Urgent + Not Important)",
        fourth: "DELETE (Not Urgent + Not Important)",
    },
    decision: QuadrantTitles {
        first: "QUICK WINS (Low Effort + High Impact)",
        second: "MAJOR PROJECTS (High Effort + High Impact)",
        third: "FILL-INS (Low Effort + Low Impact)",
        fourth: "THANKLESS TASKS (High Effort + Low Impact)",
    },
};

static STUDENT: AudienceProfile = AudienceProfile {
    mode: AudienceMode::Student,
    assistant_title: "AI Study Assistant",
    assistant_subtitle: "Your personal learning companion",
    input_placeholder: "Ask me about your study notes, subjects, or learning goals...",
    processing_text: "Analyzing your study materials...",
    welcome_message: "Hello! I'm your AI Study Assistant! 🎓 I can help you organize your study notes, identify key concepts, and keep your learning on track. What can I help you study today?",
    apology_message: "Sorry, I had trouble connecting! Let me try again - I'm here to help with your studies! 📚",
    system_prompt: "You are a helpful AI study assistant for a student using a digital notebook app. You should:
- Use encouraging, supportive language
- Focus on learning and academic success
- Suggest study-focused organization (by subject, deadline, difficulty)
- Use student-friendly terminology and emojis
- Help identify key concepts, review materials, and study priorities
- When suggesting actions, explain how they help with studying

Available actions: 'update' (to modify notes), 'archive' (to move completed study materials), 'delete' (to remove irrelevant notes)",
    notes_heading: "Current study notes:",
    request_label: "Student request",
    quick_prompts: &[
        "📚 Organize my study notes by subject",
        "⏰ What should I review today?",
        "🔍 Find duplicate study materials",
        "📈 Show my study progress",
    ],
    new_note_label: "New Study Note",
    search_placeholder: "Search study notes...",
    categories: &[
        CategoryOption { value: "subject_notes", label: "Subject Notes" },
        CategoryOption { value: "assignment", label: "Assignment" },
        CategoryOption { value: "exam_prep", label: "Exam Prep" },
        CategoryOption { value: "project_research", label: "Project Research" },
        CategoryOption { value: "reading_list", label: "Reading List" },
        CategoryOption { value: "reminder", label: "Reminder" },
    ],
    default_category: "subject_notes",
    default_note_type: "study_note",
    eisenhower: QuadrantTitles {
        first: "🔥 Do Now!",
        second: "📅 Plan It!",
        third: "👥 Ask for Help!",
        fourth: "😴 Maybe Later",
    },
    decision: QuadrantTitles {
        first: "⚡ Easy Wins!",
        second: "🚀 Big Projects!",
        third: "😊 Fun Stuff!",
        fourth: "😤 Hard & Boring",
    },
};
