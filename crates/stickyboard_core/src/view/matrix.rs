//! Quadrant classifiers for the Eisenhower and effort/impact matrices.
//!
//! # Invariants
//! - Every note lands in exactly one quadrant per matrix.
//! - Drop patches only touch priority/status/category/assignee. Eisenhower
//!   drops keep the category, so they do not always re-classify the note.

use crate::audience::{AudienceMode, QuadrantTitles};
use crate::model::note::{Note, NotePatch, NoteStatus, Priority};
use serde::Serialize;

pub const DELEGATE_ASSIGNEE: &str = "Team Member";

/// Categories that count as important (Eisenhower) or high impact
/// (decision matrix).
const HIGH_VALUE_CATEGORIES: [&str; 2] = ["work", "projects"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quadrant<'a> {
    pub key: &'static str,
    pub title: &'static str,
    pub notes: Vec<&'a Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EisenhowerQuadrant {
    Do,
    Decide,
    Delegate,
    Delete,
}

impl EisenhowerQuadrant {
    pub const ALL: [EisenhowerQuadrant; 4] = [Self::Do, Self::Decide, Self::Delegate, Self::Delete];

    pub fn key(self) -> &'static str {
        match self {
            Self::Do => "do",
            Self::Decide => "decide",
            Self::Delegate => "delegate",
            Self::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|quadrant| quadrant.key() == value)
    }

    pub fn classify(note: &Note) -> Self {
        let urgent = note.priority.is_pressing();
        let important = is_high_value(note) || note.status == NoteStatus::InProgress;
        match (urgent, important) {
            (true, true) => Self::Do,
            (false, true) => Self::Decide,
            (true, false) => Self::Delegate,
            (false, false) => Self::Delete,
        }
    }

    pub fn title(self, titles: &QuadrantTitles) -> &'static str {
        match self {
            Self::Do => titles.first,
            Self::Decide => titles.second,
            Self::Delegate => titles.third,
            Self::Delete => titles.fourth,
        }
    }

    pub fn drop_patch(self) -> NotePatch {
        match self {
            Self::Do => NotePatch {
                priority: Some(Priority::Urgent),
                status: Some(NoteStatus::InProgress),
                ..NotePatch::default()
            },
            Self::Decide => NotePatch {
                priority: Some(Priority::High),
                status: Some(NoteStatus::Active),
                ..NotePatch::default()
            },
            Self::Delegate => NotePatch {
                priority: Some(Priority::Medium),
                assigned_to: Some(Some(DELEGATE_ASSIGNEE.to_string())),
                ..NotePatch::default()
            },
            Self::Delete => NotePatch {
                priority: Some(Priority::Low),
                status: Some(NoteStatus::OnHold),
                ..NotePatch::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionQuadrant {
    QuickWins,
    MajorProjects,
    FillIns,
    ThanklessTasks,
}

impl DecisionQuadrant {
    pub const ALL: [DecisionQuadrant; 4] = [
        Self::QuickWins,
        Self::MajorProjects,
        Self::FillIns,
        Self::ThanklessTasks,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::QuickWins => "quick_wins",
            Self::MajorProjects => "major_projects",
            Self::FillIns => "fill_ins",
            Self::ThanklessTasks => "thankless_tasks",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|quadrant| quadrant.key() == value)
    }

    /// Effort follows priority, impact follows category.
    pub fn classify(note: &Note) -> Self {
        let high_effort = note.priority.is_pressing();
        let high_impact = is_high_value(note);
        match (high_effort, high_impact) {
            (false, true) => Self::QuickWins,
            (true, true) => Self::MajorProjects,
            (false, false) => Self::FillIns,
            (true, false) => Self::ThanklessTasks,
        }
    }

    pub fn title(self, titles: &QuadrantTitles) -> &'static str {
        match self {
            Self::QuickWins => titles.first,
            Self::MajorProjects => titles.second,
            Self::FillIns => titles.third,
            Self::ThanklessTasks => titles.fourth,
        }
    }

    pub fn drop_patch(self) -> NotePatch {
        let (priority, category, status) = match self {
            Self::QuickWins => (Priority::Medium, "projects", NoteStatus::InProgress),
            Self::MajorProjects => (Priority::High, "projects", NoteStatus::Active),
            Self::FillIns => (Priority::Low, "personal", NoteStatus::Active),
            Self::ThanklessTasks => (Priority::High, "todo", NoteStatus::Waiting),
        };
        NotePatch {
            priority: Some(priority),
            category: Some(Some(category.to_string())),
            status: Some(status),
            ..NotePatch::default()
        }
    }
}

pub fn eisenhower_matrix(notes: &[Note], audience: AudienceMode) -> Vec<Quadrant<'_>> {
    let titles = &audience.profile().eisenhower;
    EisenhowerQuadrant::ALL
        .into_iter()
        .map(|quadrant| Quadrant {
            key: quadrant.key(),
            title: quadrant.title(titles),
            notes: notes
                .iter()
                .filter(|note| EisenhowerQuadrant::classify(note) == quadrant)
                .collect(),
        })
        .collect()
}

pub fn decision_matrix(notes: &[Note], audience: AudienceMode) -> Vec<Quadrant<'_>> {
    let titles = &audience.profile().decision;
    DecisionQuadrant::ALL
        .into_iter()
        .map(|quadrant| Quadrant {
            key: quadrant.key(),
            title: quadrant.title(titles),
            notes: notes
                .iter()
                .filter(|note| DecisionQuadrant::classify(note) == quadrant)
                .collect(),
        })
        .collect()
}

fn is_high_value(note: &Note) -> bool {
    note.category
        .as_deref()
        .is_some_and(|category| HIGH_VALUE_CATEGORIES.iter().any(|value| *value == category))
}
