//! Search, quick filters and per-view statistics.

use super::ViewMode;
use crate::audience::AudienceMode;
use crate::model::note::{Note, NoteStatus, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickFilter {
    /// Due strictly before today.
    Overdue,
    /// Due exactly today.
    Today,
    /// No assignee.
    Unassigned,
}

impl QuickFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Unassigned => "unassigned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overdue" => Some(Self::Overdue),
            "today" => Some(Self::Today),
            "unassigned" => Some(Self::Unassigned),
            _ => None,
        }
    }

    pub fn matches(self, note: &Note, today: NaiveDate) -> bool {
        match self {
            Self::Overdue => note.due_date.is_some_and(|due| due < today),
            Self::Today => note.due_date == Some(today),
            Self::Unassigned => note
                .assigned_to
                .as_deref()
                .map_or(true, |assignee| assignee.trim().is_empty()),
        }
    }
}

/// Case-insensitive substring match on title or content. A blank query
/// keeps every note.
pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.trim().to_lowercase();
    notes
        .iter()
        .filter(|note| needle.is_empty() || note_matches(note, &needle))
        .collect()
}

/// Applies the board search box and the optional quick filter, in that order.
pub fn apply_filters(
    notes: &[Note],
    query: &str,
    quick: Option<QuickFilter>,
    today: NaiveDate,
) -> Vec<Note> {
    search_notes(notes, query)
        .into_iter()
        .filter(|note| quick.map_or(true, |filter| filter.matches(note, today)))
        .cloned()
        .collect()
}

fn note_matches(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

/// Counters shown in the view controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    pub total: usize,
    /// Per-key counts for priority/status/category views, empty otherwise.
    pub counts: Vec<(String, usize)>,
}

pub fn view_stats(notes: &[Note], mode: ViewMode, audience: AudienceMode) -> ViewStats {
    let counts = match mode {
        ViewMode::Priority => Priority::ALL
            .iter()
            .map(|priority| {
                let count = notes.iter().filter(|note| note.priority == *priority).count();
                (priority.as_str().to_string(), count)
            })
            .collect(),
        ViewMode::Status => NoteStatus::ALL
            .iter()
            .map(|status| {
                let count = notes.iter().filter(|note| note.status == *status).count();
                (status.as_str().to_string(), count)
            })
            .collect(),
        ViewMode::Category => audience
            .profile()
            .categories
            .iter()
            .map(|option| {
                let count = notes
                    .iter()
                    .filter(|note| note.category.as_deref() == Some(option.value))
                    .count();
                (option.value.to_string(), count)
            })
            .collect(),
        _ => Vec::new(),
    };

    ViewStats {
        total: notes.len(),
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_filters, search_notes, QuickFilter};
    use crate::model::note::Note;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn note(title: &str, content: &str) -> Note {
        let mut note = Note::new(Uuid::new_v4(), "tester@example.com");
        note.title = title.to_string();
        note.content = content.to_string();
        note
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let notes = vec![
            note("Quarterly Review", ""),
            note("Groceries", "<p>buy REVIEW copies</p>"),
            note("Gym", "legs"),
        ];
        let hits = search_notes(&notes, "review");
        assert_eq!(hits.len(), 2);
        assert_eq!(search_notes(&notes, "  ").len(), 3);
    }

    #[test]
    fn overdue_excludes_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut due_today = note("a", "");
        due_today.due_date = Some(today);
        let mut overdue = note("b", "");
        overdue.due_date = NaiveDate::from_ymd_opt(2024, 4, 30);
        let notes = vec![due_today, overdue.clone(), note("c", "")];

        let filtered = apply_filters(&notes, "", Some(QuickFilter::Overdue), today);
        assert_eq!(filtered, vec![overdue]);

        let filtered = apply_filters(&notes, "", Some(QuickFilter::Today), today);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "a");
    }

    #[test]
    fn blank_assignee_counts_as_unassigned() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut blank = note("a", "");
        blank.assigned_to = Some(" ".to_string());
        let mut assigned = note("b", "");
        assigned.assigned_to = Some("Dana".to_string());

        assert!(QuickFilter::Unassigned.matches(&blank, today));
        assert!(!QuickFilter::Unassigned.matches(&assigned, today));
    }
}
