use stickyboard_core::db::open_db_in_memory;
use stickyboard_core::model::board::Board;
use stickyboard_core::model::note::{Note, NoteColor, NotePatch, NoteStatus, Priority};
use stickyboard_core::repo::{
    BoardFilter, BoardRepository, EntityKind, NoteFilter, NoteRepository, SqliteBoardRepository,
    SqliteNoteRepository,
};
use stickyboard_core::service::{BoardService, NoteService, NoteServiceError};
use stickyboard_core::{AudienceMode, NoteDraft, RepoError, SortSpec};
use uuid::Uuid;

const OWNER: &str = "owner@example.com";

#[test]
fn create_and_get_note_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let notes = SqliteNoteRepository::new(&conn);
    let board = boards.create_board(&Board::new("Inbox", OWNER)).unwrap();

    let mut note = Note::new(board.id, OWNER);
    note.title = "Call supplier".to_string();
    note.color = NoteColor::Blue;
    note.priority = Priority::High;
    note.tags = vec!["phone".to_string()];
    note.due_date = "2024-03-01".parse().ok();
    let created = notes.create_note(&note).unwrap();
    assert!(created.created_date > 0);
    assert_eq!(created.created_date, created.updated_date);

    let loaded = notes.get_note(note.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.tags, vec!["phone".to_string()]);
    assert_eq!(loaded.due_date, "2024-03-01".parse().ok());
}

#[test]
fn update_applies_patch_and_keeps_untouched_fields() {
    let conn = open_db_in_memory().unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let notes = SqliteNoteRepository::new(&conn);
    let board = boards.create_board(&Board::new("Inbox", OWNER)).unwrap();

    let mut note = Note::new(board.id, OWNER);
    note.title = "Draft".to_string();
    note.category = Some("work".to_string());
    notes.create_note(&note).unwrap();

    let patch = NotePatch {
        status: Some(NoteStatus::Completed),
        category: Some(None),
        ..NotePatch::default()
    };
    let updated = notes.update_note(note.id, &patch).unwrap();
    assert_eq!(updated.title, "Draft");
    assert_eq!(updated.status, NoteStatus::Completed);
    assert_eq!(updated.category, None);
}

#[test]
fn update_of_missing_note_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let notes = SqliteNoteRepository::new(&conn);
    let missing = Uuid::new_v4();

    let err = notes.update_note(missing, &NotePatch::archived(true)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: EntityKind::Note, id } if id == missing
    ));
}

#[test]
fn board_listing_sorts_and_filters_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let first = boards.create_board(&Board::new("Beta", OWNER)).unwrap();
    let second = boards.create_board(&Board::new("Alpha", OWNER)).unwrap();
    boards
        .create_board(&Board::new("Elsewhere", "other@example.com"))
        .unwrap();

    let by_name = boards
        .filter_boards(
            &BoardFilter::owned_by(OWNER),
            Some(&SortSpec::parse("name").unwrap()),
        )
        .unwrap();
    let names: Vec<&str> = by_name.iter().map(|board| board.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    let newest = boards
        .filter_boards(&BoardFilter::owned_by(OWNER), Some(&SortSpec::NEWEST_FIRST))
        .unwrap();
    let ids: Vec<Uuid> = newest.iter().map(|board| board.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn unknown_sort_field_is_rejected() {
    let err = SortSpec::parse("-color").unwrap_err();
    assert!(matches!(err, RepoError::InvalidSort(value) if value == "-color"));
}

#[test]
fn active_listing_excludes_archived_notes() {
    let conn = open_db_in_memory().unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let notes = SqliteNoteRepository::new(&conn);
    let board = boards.create_board(&Board::new("Inbox", OWNER)).unwrap();

    let kept = notes.create_note(&Note::new(board.id, OWNER)).unwrap();
    let mut hidden = Note::new(board.id, OWNER);
    hidden.archive();
    notes.create_note(&hidden).unwrap();

    let active = notes
        .filter_notes(&NoteFilter::active_on_board(board.id), None)
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, kept.id);

    let archived = notes
        .filter_notes(&NoteFilter::archived_by(OWNER), None)
        .unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, hidden.id);
}

#[test]
fn created_notes_fill_the_grid_with_audience_defaults() {
    let conn = open_db_in_memory().unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let board = boards.create_board(&Board::new("Study", OWNER)).unwrap();
    let service = NoteService::new(SqliteNoteRepository::new(&conn));

    let mut created = Vec::new();
    for index in 0..6 {
        let draft = NoteDraft {
            title: format!("note {index}"),
            ..NoteDraft::default()
        };
        created.push(
            service
                .create_note(board.id, OWNER, draft, AudienceMode::Student)
                .unwrap(),
        );
    }

    assert_eq!((created[0].position_x, created[0].position_y), (50.0, 120.0));
    assert_eq!((created[4].position_x, created[4].position_y), (1250.0, 120.0));
    assert_eq!((created[5].position_x, created[5].position_y), (50.0, 360.0));
    assert_eq!(created[0].category.as_deref(), Some("subject_notes"));
    assert_eq!(created[0].note_type.as_deref(), Some("study_note"));
}

#[test]
fn archive_and_restore_move_notes_between_listings() {
    let conn = open_db_in_memory().unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let board = boards.create_board(&Board::new("Inbox", OWNER)).unwrap();
    let service = NoteService::new(SqliteNoteRepository::new(&conn));
    let note = service
        .create_note(board.id, OWNER, NoteDraft::default(), AudienceMode::Professional)
        .unwrap();

    service.archive_note(note.id).unwrap();
    assert!(service.board_notes(board.id).unwrap().is_empty());

    service.restore_note(note.id).unwrap();
    assert_eq!(service.board_notes(board.id).unwrap().len(), 1);

    service.delete_note(note.id).unwrap();
    let err = service.get_note(note.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == note.id));
}

#[test]
fn deleting_a_board_removes_archived_notes_too() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(
        SqliteBoardRepository::new(&conn),
        SqliteNoteRepository::new(&conn),
    );
    let notes = SqliteNoteRepository::new(&conn);
    let board = service.create_board("Project X", OWNER).unwrap();
    let other = service.create_board("Keep", OWNER).unwrap();

    notes.create_note(&Note::new(board.id, OWNER)).unwrap();
    let mut archived = Note::new(board.id, OWNER);
    archived.archive();
    notes.create_note(&archived).unwrap();
    let survivor = notes.create_note(&Note::new(other.id, OWNER)).unwrap();

    assert_eq!(service.delete_board(board.id, OWNER).unwrap(), 2);

    let remaining = notes.list_notes().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, survivor.id);
    assert_eq!(service.boards_of(OWNER).unwrap().len(), 1);
}
