//! Field-keyed grouping for the priority/status/category/type/project/owner
//! views.
//!
//! # Invariants
//! - Fixed-key views always emit every fixed group, even when empty.
//! - Category and type views append an `other` group (only when non-empty)
//!   for unset or unknown values, so groups partition the input.
//! - Project and owner views emit dynamic keys in first-seen order, with
//!   missing values under `Unassigned`.

use super::ViewMode;
use crate::audience::AudienceMode;
use crate::model::note::{Note, NoteStatus, Priority};
use serde::Serialize;

pub const OTHER_GROUP_KEY: &str = "other";
pub const UNASSIGNED_GROUP_KEY: &str = "Unassigned";
pub const ALL_GROUP_KEY: &str = "all";

pub const NOTE_TYPE_KEYS: [&str; 5] = ["task", "idea", "reminder", "reference", "meeting_note"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteGroup<'a> {
    pub key: String,
    pub title: String,
    pub notes: Vec<&'a Note>,
}

impl<'a> NoteGroup<'a> {
    fn new(key: &str, mode: ViewMode, notes: Vec<&'a Note>) -> Self {
        Self {
            key: key.to_string(),
            title: group_title(key, mode),
            notes,
        }
    }
}

/// Groups `notes` for a grouped view mode.
///
/// Non-grouped modes collapse into a single `all` group.
pub fn group_notes<'a>(
    notes: &'a [Note],
    mode: ViewMode,
    audience: AudienceMode,
) -> Vec<NoteGroup<'a>> {
    match mode {
        ViewMode::Priority => Priority::ALL
            .iter()
            .map(|priority| {
                let members = notes
                    .iter()
                    .filter(|note| note.priority == *priority)
                    .collect();
                NoteGroup::new(priority.as_str(), mode, members)
            })
            .collect(),
        ViewMode::Status => NoteStatus::ALL
            .iter()
            .map(|status| {
                let members = notes.iter().filter(|note| note.status == *status).collect();
                NoteGroup::new(status.as_str(), mode, members)
            })
            .collect(),
        ViewMode::Category => {
            let keys = audience.profile().category_values();
            fixed_groups(notes, mode, &keys, |note| note.category.as_deref())
        }
        ViewMode::Type => fixed_groups(notes, mode, &NOTE_TYPE_KEYS, |note| {
            note.note_type.as_deref()
        }),
        ViewMode::Project => dynamic_groups(notes, mode, |note| note.project.as_deref()),
        ViewMode::Owner => dynamic_groups(notes, mode, |note| note.assigned_to.as_deref()),
        _ => vec![NoteGroup::new(ALL_GROUP_KEY, mode, notes.iter().collect())],
    }
}

fn fixed_groups<'a, F>(
    notes: &'a [Note],
    mode: ViewMode,
    keys: &[&str],
    field: F,
) -> Vec<NoteGroup<'a>>
where
    F: Fn(&Note) -> Option<&str>,
{
    let mut groups: Vec<NoteGroup<'a>> = keys
        .iter()
        .map(|key| NoteGroup::new(key, mode, Vec::new()))
        .collect();
    let mut other = Vec::new();

    for note in notes {
        let slot = field(note).and_then(|value| keys.iter().position(|key| *key == value));
        match slot {
            Some(index) => groups[index].notes.push(note),
            None => other.push(note),
        }
    }

    if !other.is_empty() {
        groups.push(NoteGroup::new(OTHER_GROUP_KEY, mode, other));
    }
    groups
}

fn dynamic_groups<'a, F>(notes: &'a [Note], mode: ViewMode, field: F) -> Vec<NoteGroup<'a>>
where
    F: Fn(&Note) -> Option<&str>,
{
    let mut groups: Vec<NoteGroup<'a>> = Vec::new();
    for note in notes {
        let key = field(note)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNASSIGNED_GROUP_KEY);
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.notes.push(note),
            None => groups.push(NoteGroup::new(key, mode, vec![note])),
        }
    }
    groups
}

/// Display title for a group key.
pub fn group_title(key: &str, mode: ViewMode) -> String {
    let fixed = match mode {
        ViewMode::Priority => match key {
            "urgent" => Some("Urgent Priority"),
            "high" => Some("High Priority"),
            "medium" => Some("Medium Priority"),
            "low" => Some("Low Priority"),
            _ => None,
        },
        ViewMode::Status => match key {
            "active" => Some("Active"),
            "in_progress" => Some("In Progress"),
            "waiting" => Some("Waiting"),
            "completed" => Some("Completed"),
            "on_hold" => Some("On Hold"),
            _ => None,
        },
        ViewMode::Timeline => match key {
            "overdue" => Some("Overdue"),
            "today" => Some("Due Today"),
            "upcoming" => Some("Upcoming"),
            "no_date" => Some("No Due Date"),
            _ => None,
        },
        _ => None,
    };
    match fixed {
        Some(title) => title.to_string(),
        None => title_case(key),
    }
}

/// `meeting_note` -> `Meeting Note`.
fn title_case(key: &str) -> String {
    let mut title = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphanumeric() {
            if at_word_start {
                title.extend(ch.to_uppercase());
            } else {
                title.push(ch);
            }
            at_word_start = false;
        } else {
            title.push(ch);
            at_word_start = true;
        }
    }
    title
}
