use chrono::NaiveDate;
use std::collections::HashSet;
use stickyboard_core::model::board::Board;
use stickyboard_core::model::note::{Note, NoteStatus, Priority};
use stickyboard_core::view::{group_notes, timeline_entries, TimelineMarker};
use stickyboard_core::{layout, AudienceMode, ViewContext, ViewLayout, ViewMode};
use uuid::Uuid;

fn day(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn sample_notes() -> Vec<Note> {
    let board = Board::new("Sample", "a@example.com");
    let specs: [(Option<&str>, Priority, NoteStatus, Option<&str>); 6] = [
        (Some("work"), Priority::Urgent, NoteStatus::Active, Some("task")),
        (Some("personal"), Priority::Low, NoteStatus::Completed, Some("idea")),
        (None, Priority::Medium, NoteStatus::Waiting, None),
        (Some("made-up"), Priority::High, NoteStatus::InProgress, Some("recipe")),
        (Some("work"), Priority::Medium, NoteStatus::OnHold, Some("meeting_note")),
        (Some("ideas"), Priority::High, NoteStatus::Active, Some("reference")),
    ];
    specs
        .into_iter()
        .map(|(category, priority, status, note_type)| {
            let mut note = Note::new(board.id, "a@example.com");
            note.category = category.map(str::to_string);
            note.priority = priority;
            note.status = status;
            note.note_type = note_type.map(str::to_string);
            note
        })
        .collect()
}

#[test]
fn grouped_views_place_every_note_exactly_once() {
    let notes = sample_notes();
    let all_ids: HashSet<Uuid> = notes.iter().map(|note| note.id).collect();

    for mode in [
        ViewMode::Category,
        ViewMode::Priority,
        ViewMode::Status,
        ViewMode::Type,
        ViewMode::Project,
        ViewMode::Owner,
    ] {
        for audience in [AudienceMode::Professional, AudienceMode::Student] {
            let groups = group_notes(&notes, mode, audience);
            let placed: Vec<Uuid> = groups
                .iter()
                .flat_map(|group| group.notes.iter().map(|note| note.id))
                .collect();
            assert_eq!(placed.len(), notes.len(), "mode {}", mode.as_str());
            let unique: HashSet<Uuid> = placed.into_iter().collect();
            assert_eq!(unique, all_ids, "mode {}", mode.as_str());
        }
    }
}

#[test]
fn priority_groups_follow_fixed_order() {
    let notes = sample_notes();
    let keys: Vec<String> = group_notes(&notes, ViewMode::Priority, AudienceMode::Professional)
        .into_iter()
        .map(|group| group.key)
        .collect();
    assert_eq!(keys, vec!["urgent", "high", "medium", "low"]);
}

#[test]
fn unknown_categories_land_in_trailing_other_group() {
    let notes = sample_notes();
    let groups = group_notes(&notes, ViewMode::Category, AudienceMode::Professional);
    let last = groups.last().unwrap();
    assert_eq!(last.key, "other");
    // No category and "made-up".
    assert_eq!(last.notes.len(), 2);
}

#[test]
fn timeline_sorts_by_due_date_with_undated_last() {
    let board = Board::new("Dates", "a@example.com");
    let mut third = Note::new(board.id, "a@example.com");
    third.due_date = Some(day("2024-01-03"));
    let mut first = Note::new(board.id, "a@example.com");
    first.due_date = Some(day("2024-01-01"));
    let undated = Note::new(board.id, "a@example.com");
    let notes = vec![third.clone(), first.clone(), undated.clone()];

    let entries = timeline_entries(&notes, day("2024-01-02"));
    let order: Vec<Uuid> = entries.iter().map(|entry| entry.note.id).collect();
    assert_eq!(order, vec![first.id, third.id, undated.id]);

    let markers: Vec<TimelineMarker> = entries.iter().map(|entry| entry.marker).collect();
    assert_eq!(
        markers,
        vec![
            TimelineMarker::Overdue,
            TimelineMarker::Upcoming,
            TimelineMarker::NoDate
        ]
    );
}

#[test]
fn every_view_mode_renders_all_notes() {
    let notes = sample_notes();
    let context = ViewContext {
        audience: AudienceMode::Professional,
        today: day("2024-05-01"),
    };

    for mode in ViewMode::ALL {
        let rendered = layout(&notes, mode, &context);
        assert_eq!(rendered.note_count(), notes.len(), "mode {}", mode.as_str());
    }
}

#[test]
fn freeform_layout_keeps_input_order() {
    let notes = sample_notes();
    let context = ViewContext {
        audience: AudienceMode::Student,
        today: day("2024-05-01"),
    };

    match layout(&notes, ViewMode::Freeform, &context) {
        ViewLayout::Freeform { notes: placed } => {
            let ids: Vec<Uuid> = placed.iter().map(|note| note.id).collect();
            let expected: Vec<Uuid> = notes.iter().map(|note| note.id).collect();
            assert_eq!(ids, expected);
        }
        other => panic!("unexpected layout: {other:?}"),
    }
}
