//! Boards overview use-cases.
//!
//! # Responsibility
//! - List the owner's boards with per-board note statistics.
//! - Create, rename, open and delete boards.
//!
//! # Invariants
//! - Statistics count active (non-archived) notes only.
//! - Board deletion removes every note of the board (archived included)
//!   before the board record, so the note foreign key never blocks it.
//! - A board that is missing or owned by someone else is reported as
//!   `BoardNotFound`; ownership is never leaked.

use crate::model::board::{Board, BoardId, BoardPatch};
use crate::model::note::{NoteStatus, Priority};
use crate::repo::{
    BoardFilter, BoardRepository, EntityKind, NoteFilter, NoteRepository, PreferenceStore,
    Preferences, RepoError, SortSpec,
};
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum BoardServiceError {
    BoardNotFound(BoardId),
    Repo(RepoError),
}

impl BoardServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BoardNotFound(_) => "board_not_found",
            Self::Repo(err) => err.code(),
        }
    }
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BoardNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for BoardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: EntityKind::Board,
                id,
            } => Self::BoardNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Counters shown on a board card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub urgent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub board: Board,
    pub stats: BoardStats,
}

pub struct BoardService<B: BoardRepository, N: NoteRepository> {
    boards: B,
    notes: N,
}

impl<B: BoardRepository, N: NoteRepository> BoardService<B, N> {
    pub fn new(boards: B, notes: N) -> Self {
        Self { boards, notes }
    }

    /// Boards of `owner_email`, newest first.
    pub fn boards_of(&self, owner_email: &str) -> Result<Vec<Board>, BoardServiceError> {
        Ok(self.boards.filter_boards(
            &BoardFilter::owned_by(owner_email),
            Some(&SortSpec::NEWEST_FIRST),
        )?)
    }

    /// Boards overview: every owned board with its statistics.
    pub fn overview(&self, owner_email: &str) -> Result<Vec<BoardSummary>, BoardServiceError> {
        let boards = self.boards_of(owner_email)?;
        let mut stats: HashMap<BoardId, BoardStats> = HashMap::new();
        for note in self.notes.filter_notes(&NoteFilter::active(), None)? {
            let entry = stats.entry(note.board_id).or_default();
            entry.total += 1;
            if note.status == NoteStatus::Completed {
                entry.completed += 1;
            }
            if note.priority == Priority::Urgent {
                entry.urgent += 1;
            }
        }

        Ok(boards
            .into_iter()
            .map(|board| BoardSummary {
                stats: stats.get(&board.id).copied().unwrap_or_default(),
                board,
            })
            .collect())
    }

    pub fn create_board(&self, name: &str, owner_email: &str) -> Result<Board, BoardServiceError> {
        let board = self
            .boards
            .create_board(&Board::new(name, owner_email))
            .map_err(|err| {
                error!(
                    "event=board_create module=service status=error error_code={} error={err}",
                    err.code()
                );
                BoardServiceError::from(err)
            })?;
        info!(
            "event=board_create module=service status=ok board_id={}",
            board.id
        );
        Ok(board)
    }

    pub fn rename_board(
        &self,
        id: BoardId,
        owner_email: &str,
        name: &str,
    ) -> Result<Board, BoardServiceError> {
        self.owned_board(id, owner_email)?;
        Ok(self.boards.update_board(
            id,
            &BoardPatch {
                name: Some(name.trim().to_string()),
            },
        )?)
    }

    /// Board `id` if it exists and belongs to `owner_email`.
    pub fn owned_board(&self, id: BoardId, owner_email: &str) -> Result<Board, BoardServiceError> {
        match self.boards.get_board(id)? {
            Some(board) if board.owner_email.eq_ignore_ascii_case(owner_email) => Ok(board),
            _ => Err(BoardServiceError::BoardNotFound(id)),
        }
    }

    /// Opens a board and remembers it as the last visited one.
    pub fn open_board<S: PreferenceStore>(
        &self,
        id: BoardId,
        owner_email: &str,
        prefs: &Preferences<S>,
    ) -> Result<Board, BoardServiceError> {
        let board = self.owned_board(id, owner_email)?;
        prefs.set_last_board_id(board.id)?;
        Ok(board)
    }

    /// Last visited board, forgetting the preference when it is stale.
    pub fn resume_last_board<S: PreferenceStore>(
        &self,
        owner_email: &str,
        prefs: &Preferences<S>,
    ) -> Result<Option<Board>, BoardServiceError> {
        let Some(id) = prefs.last_board_id()? else {
            return Ok(None);
        };
        match self.owned_board(id, owner_email) {
            Ok(board) => Ok(Some(board)),
            Err(BoardServiceError::BoardNotFound(_)) => {
                prefs.forget_last_board_id()?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Deletes the board's notes, then the board.
    ///
    /// Returns the number of notes removed.
    pub fn delete_board(&self, id: BoardId, owner_email: &str) -> Result<usize, BoardServiceError> {
        let started_at = Instant::now();
        self.owned_board(id, owner_email)?;
        info!("event=board_delete module=service status=start board_id={id}");

        let result = self.cascade_delete(id);
        match &result {
            Ok(removed) => info!(
                "event=board_delete module=service status=ok board_id={id} notes_removed={removed} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=board_delete module=service status=error board_id={id} duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }

    fn cascade_delete(&self, id: BoardId) -> Result<usize, BoardServiceError> {
        let filter = NoteFilter {
            board_id: Some(id),
            ..NoteFilter::default()
        };
        let notes = self.notes.filter_notes(&filter, None)?;
        for note in &notes {
            self.notes.delete_note(note.id)?;
        }
        self.boards.delete_board(id)?;
        Ok(notes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardService, BoardServiceError};
    use crate::db::open_db_in_memory;
    use crate::model::note::{Note, NoteStatus, Priority};
    use crate::repo::{
        BoardRepository, MemoryPreferenceStore, NoteRepository, Preferences,
        SqliteBoardRepository, SqliteNoteRepository,
    };

    const OWNER: &str = "owner@example.com";

    #[test]
    fn overview_counts_active_notes_only() {
        let conn = open_db_in_memory().unwrap();
        let service = BoardService::new(
            SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
        );
        let notes = SqliteNoteRepository::new(&conn);
        let board = service.create_board("  Sprint  ", OWNER).unwrap();
        assert_eq!(board.name, "Sprint");

        let mut done = Note::new(board.id, OWNER);
        done.status = NoteStatus::Completed;
        done.priority = Priority::Urgent;
        notes.create_note(&done).unwrap();
        let mut archived = Note::new(board.id, OWNER);
        archived.is_archived = true;
        notes.create_note(&archived).unwrap();

        let overview = service.overview(OWNER).unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].stats.total, 1);
        assert_eq!(overview[0].stats.completed, 1);
        assert_eq!(overview[0].stats.urgent, 1);
    }

    #[test]
    fn foreign_board_is_not_found() {
        let conn = open_db_in_memory().unwrap();
        let service = BoardService::new(
            SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
        );
        let board = service.create_board("Private", OWNER).unwrap();

        let err = service
            .owned_board(board.id, "intruder@example.com")
            .unwrap_err();
        assert!(matches!(err, BoardServiceError::BoardNotFound(id) if id == board.id));
    }

    #[test]
    fn stale_last_board_is_forgotten() {
        let conn = open_db_in_memory().unwrap();
        let service = BoardService::new(
            SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
        );
        let prefs = Preferences::new(MemoryPreferenceStore::new());
        let board = service.create_board("Temp", OWNER).unwrap();
        service.open_board(board.id, OWNER, &prefs).unwrap();
        assert_eq!(prefs.last_board_id().unwrap(), Some(board.id));

        service.delete_board(board.id, OWNER).unwrap();
        assert!(service.resume_last_board(OWNER, &prefs).unwrap().is_none());
        assert_eq!(prefs.last_board_id().unwrap(), None);
        assert!(SqliteBoardRepository::new(&conn)
            .get_board(board.id)
            .unwrap()
            .is_none());
    }
}
