//! Archive page use-cases.
//!
//! # Invariants
//! - Only archived notes created by the current user are listed, restored or
//!   deleted. Other users' notes report `NoteNotFound`.
//! - Restoring clears `is_archived`; deleting is permanent.

use crate::ai::prompt::UNKNOWN_BOARD_NAME;
use crate::model::board::BoardId;
use crate::model::note::{Note, NoteId};
use crate::repo::{BoardRepository, NoteFilter, NoteRepository, SortSpec};
use crate::service::note_service::{NoteService, NoteServiceError};
use log::info;
use serde::Serialize;
use std::collections::HashMap;

/// Archived note together with the name of the board it lives on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedNote {
    pub note: Note,
    pub board_name: String,
}

/// Case-insensitive match over title, content and board name.
pub fn search_archive<'a>(items: &'a [ArchivedNote], query: &str) -> Vec<&'a ArchivedNote> {
    let needle = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            needle.is_empty()
                || item.note.title.to_lowercase().contains(&needle)
                || item.note.content.to_lowercase().contains(&needle)
                || item.board_name.to_lowercase().contains(&needle)
        })
        .collect()
}

pub struct ArchiveService<B: BoardRepository, N: NoteRepository> {
    boards: B,
    notes: NoteService<N>,
}

impl<B: BoardRepository, N: NoteRepository> ArchiveService<B, N> {
    pub fn new(boards: B, notes: N) -> Self {
        Self {
            boards,
            notes: NoteService::new(notes),
        }
    }

    /// Archived notes of `email`, newest first.
    pub fn archived_notes(&self, email: &str) -> Result<Vec<ArchivedNote>, NoteServiceError> {
        let names: HashMap<BoardId, String> = self
            .boards
            .list_boards()?
            .into_iter()
            .map(|board| (board.id, board.name))
            .collect();
        let notes = self
            .notes
            .repo()
            .filter_notes(&NoteFilter::archived_by(email), Some(&SortSpec::NEWEST_FIRST))?;

        Ok(notes
            .into_iter()
            .map(|note| ArchivedNote {
                board_name: names
                    .get(&note.board_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_BOARD_NAME.to_string()),
                note,
            })
            .collect())
    }

    /// Restores a note archived by `email`.
    pub fn restore(&self, id: NoteId, email: &str) -> Result<Note, NoteServiceError> {
        self.notes.owned_note(id, email)?;
        let note = self.notes.restore_note(id)?;
        info!("event=note_restore module=service status=ok note_id={id}");
        Ok(note)
    }

    pub fn delete_permanently(&self, id: NoteId, email: &str) -> Result<(), NoteServiceError> {
        self.notes.owned_note(id, email)?;
        self.notes.delete_note(id)?;
        info!("event=note_purge module=service status=ok note_id={id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{search_archive, ArchiveService, ArchivedNote};
    use crate::service::note_service::NoteServiceError;
    use crate::db::open_db_in_memory;
    use crate::model::board::Board;
    use crate::model::note::Note;
    use crate::repo::{
        BoardRepository, NoteRepository, SqliteBoardRepository, SqliteNoteRepository,
    };
    use uuid::Uuid;

    const EMAIL: &str = "tester@example.com";

    #[test]
    fn search_matches_board_name() {
        let mut note = Note::new(Uuid::new_v4(), EMAIL);
        note.title = "Groceries".to_string();
        let items = vec![ArchivedNote {
            note,
            board_name: "Household".to_string(),
        }];

        assert_eq!(search_archive(&items, "house").len(), 1);
        assert_eq!(search_archive(&items, "GROC").len(), 1);
        assert!(search_archive(&items, "office").is_empty());
        assert_eq!(search_archive(&items, "  ").len(), 1);
    }

    #[test]
    fn lists_only_own_archived_notes() {
        let conn = open_db_in_memory().unwrap();
        let board = SqliteBoardRepository::new(&conn)
            .create_board(&Board::new("Home", EMAIL))
            .unwrap();
        let notes = SqliteNoteRepository::new(&conn);
        let mut mine = Note::new(board.id, EMAIL);
        mine.is_archived = true;
        let mine = notes.create_note(&mine).unwrap();
        let mut theirs = Note::new(board.id, "other@example.com");
        theirs.is_archived = true;
        notes.create_note(&theirs).unwrap();
        notes.create_note(&Note::new(board.id, EMAIL)).unwrap();

        let service = ArchiveService::new(
            SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
        );
        let archived = service.archived_notes(EMAIL).unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].note.id, mine.id);
        assert_eq!(archived[0].board_name, "Home");

        service.restore(mine.id, EMAIL).unwrap();
        assert!(service.archived_notes(EMAIL).unwrap().is_empty());
    }

    #[test]
    fn other_users_cannot_restore_or_purge() {
        let conn = open_db_in_memory().unwrap();
        let board = SqliteBoardRepository::new(&conn)
            .create_board(&Board::new("Home", EMAIL))
            .unwrap();
        let notes = SqliteNoteRepository::new(&conn);
        let mut mine = Note::new(board.id, EMAIL);
        mine.is_archived = true;
        let mine = notes.create_note(&mine).unwrap();

        let service = ArchiveService::new(
            SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
        );
        let intruder = "intruder@example.com";
        assert!(service.archived_notes(intruder).unwrap().is_empty());
        assert!(matches!(
            service.restore(mine.id, intruder),
            Err(NoteServiceError::NoteNotFound(id)) if id == mine.id
        ));
        assert!(matches!(
            service.delete_permanently(mine.id, intruder),
            Err(NoteServiceError::NoteNotFound(_))
        ));

        let stored = notes.get_note(mine.id).unwrap().unwrap();
        assert!(stored.is_archived);
        service.delete_permanently(mine.id, "Tester@Example.com").unwrap();
        assert!(notes.get_note(mine.id).unwrap().is_none());
    }
}
