//! Timeline ordering and due-date markers.

use super::group::NoteGroup;
use super::{group_title, ViewMode};
use crate::model::note::{Note, NoteStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

/// Dot shown next to a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMarker {
    Completed,
    NoDate,
    Overdue,
    DueToday,
    Upcoming,
}

impl TimelineMarker {
    /// Completion wins over any date state.
    pub fn for_note(note: &Note, today: NaiveDate) -> Self {
        if note.status == NoteStatus::Completed {
            return Self::Completed;
        }
        match note.due_date {
            None => Self::NoDate,
            Some(due) if due < today => Self::Overdue,
            Some(due) if due == today => Self::DueToday,
            Some(_) => Self::Upcoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry<'a> {
    pub note: &'a Note,
    pub marker: TimelineMarker,
}

/// Stable ascending sort by due date; notes without a due date go last.
pub fn timeline_order(notes: &[Note]) -> Vec<&Note> {
    let mut ordered: Vec<&Note> = notes.iter().collect();
    ordered.sort_by(|left, right| compare_due(left.due_date, right.due_date));
    ordered
}

pub fn timeline_entries(notes: &[Note], today: NaiveDate) -> Vec<TimelineEntry<'_>> {
    timeline_order(notes)
        .into_iter()
        .map(|note| TimelineEntry {
            note,
            marker: TimelineMarker::for_note(note, today),
        })
        .collect()
}

/// Overdue / today / upcoming / no-date buckets, always all four.
pub fn timeline_buckets(notes: &[Note], today: NaiveDate) -> Vec<NoteGroup<'_>> {
    let mut overdue = Vec::new();
    let mut due_today = Vec::new();
    let mut upcoming = Vec::new();
    let mut no_date = Vec::new();

    for note in notes {
        match note.due_date {
            None => no_date.push(note),
            Some(due) => match due.cmp(&today) {
                Ordering::Less => overdue.push(note),
                Ordering::Equal => due_today.push(note),
                Ordering::Greater => upcoming.push(note),
            },
        }
    }

    [
        ("overdue", overdue),
        ("today", due_today),
        ("upcoming", upcoming),
        ("no_date", no_date),
    ]
    .into_iter()
    .map(|(key, notes)| NoteGroup {
        key: key.to_string(),
        title: group_title(key, ViewMode::Timeline),
        notes,
    })
    .collect()
}

fn compare_due(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
