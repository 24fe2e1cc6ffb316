//! Note use-case service.
//!
//! # Responsibility
//! - Create notes with palette color, grid position and audience defaults.
//! - Route every mutation (edit, archive, move, suggestion, connection,
//!   attachment) through `NoteRepository::update_note`.
//!
//! # Invariants
//! - New notes land at `x = 50 + (n mod 5)·300`, `y = 120 + ⌊n/5⌋·240`, where
//!   `n` counts the board's active notes.
//! - Moves are clamped to the canvas bounds before persisting.
//! - Bulk suggestion application is sequential and never stops early.

use crate::ai::suggestion::Suggestion;
use crate::audience::AudienceMode;
use crate::drag::{clamp_position, Point};
use crate::integration::{FileUploader, IntegrationError, UploadRequest};
use crate::model::board::BoardId;
use crate::model::note::{
    Attachment, AttachmentKind, ConnectionKind, Note, NoteColor, NoteConnection, NoteDraft, NoteId,
    NotePatch, NoteValidationError,
};
use crate::repo::{EntityKind, NoteFilter, NoteRepository, RepoError, SortSpec};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const GRID_ORIGIN_X: f64 = 50.0;
const GRID_ORIGIN_Y: f64 = 120.0;
const GRID_STEP_X: f64 = 300.0;
const GRID_STEP_Y: f64 = 240.0;
const GRID_COLUMNS: usize = 5;

static URL_HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://(?:[^@/?#]*@)?([^:/?#]+)")
        .expect("valid url host regex")
});

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    NoteNotFound(NoteId),
    /// Connection would point at the note itself or repeat an edge.
    InvalidConnection(NoteValidationError),
    /// Link attachment URL has no recognizable host.
    InvalidLink(String),
    Integration(IntegrationError),
    Repo(RepoError),
}

impl NoteServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoteNotFound(_) => "note_not_found",
            Self::InvalidConnection(_) => "invalid_connection",
            Self::InvalidLink(_) => "invalid_link",
            Self::Integration(err) => err.code(),
            Self::Repo(err) => err.code(),
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidConnection(err) => write!(f, "{err}"),
            Self::InvalidLink(url) => write!(f, "link `{url}` has no host"),
            Self::Integration(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConnection(err) => Some(err),
            Self::Integration(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) | Self::InvalidLink(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: EntityKind::Note,
                id,
            } => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<IntegrationError> for NoteServiceError {
    fn from(value: IntegrationError) -> Self {
        Self::Integration(value)
    }
}

/// Result of applying a batch of assistant suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkApplyOutcome {
    pub applied: usize,
    pub failed: usize,
}

/// Default canvas slot for the `index`-th note on a board.
pub fn grid_position(index: usize) -> Point {
    Point::new(
        GRID_ORIGIN_X + (index % GRID_COLUMNS) as f64 * GRID_STEP_X,
        GRID_ORIGIN_Y + (index / GRID_COLUMNS) as f64 * GRID_STEP_Y,
    )
}

/// Random palette color for a new note.
pub fn random_color() -> NoteColor {
    let index = rand::rng().random_range(0..NoteColor::ALL.len());
    NoteColor::ALL[index]
}

/// Host part of `url`, used as a link attachment's display name.
pub fn link_host(url: &str) -> Option<String> {
    URL_HOST_RE
        .captures(url.trim())
        .and_then(|captures| captures.get(1))
        .map(|host| host.as_str().to_ascii_lowercase())
}

/// Draft value that should fall back to the audience default.
fn is_blank(value: &Option<Option<String>>) -> bool {
    match value {
        Some(inner) => inner.as_deref().map_or(true, |text| text.trim().is_empty()),
        None => false,
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Active notes on one board, newest first.
    pub fn board_notes(&self, board_id: BoardId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self
            .repo
            .filter_notes(&NoteFilter::active_on_board(board_id), Some(&SortSpec::NEWEST_FIRST))?)
    }

    /// Active notes of `email` across every board, newest first.
    pub fn active_notes_of(&self, email: &str) -> Result<Vec<Note>, NoteServiceError> {
        let filter = NoteFilter {
            created_by: Some(email.to_string()),
            ..NoteFilter::active()
        };
        Ok(self
            .repo
            .filter_notes(&filter, Some(&SortSpec::NEWEST_FIRST))?)
    }

    pub fn get_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Loads a note created by `email` (case-insensitive).
    ///
    /// Notes of other users are reported as `NoteNotFound`.
    pub fn owned_note(&self, id: NoteId, email: &str) -> Result<Note, NoteServiceError> {
        let note = self.get_note(id)?;
        if !note.created_by.eq_ignore_ascii_case(email.trim()) {
            warn!(
                "event=note_access module=service status=error note_id={id} error_code=not_owner"
            );
            return Err(NoteServiceError::NoteNotFound(id));
        }
        Ok(note)
    }

    /// Creates a note from the editor draft.
    ///
    /// Missing category and type fall back to the audience defaults.
    pub fn create_note(
        &self,
        board_id: BoardId,
        created_by: &str,
        draft: NoteDraft,
        audience: AudienceMode,
    ) -> Result<Note, NoteServiceError> {
        let existing = self
            .repo
            .filter_notes(&NoteFilter::active_on_board(board_id), None)?
            .len();
        let profile = audience.profile();
        let position = grid_position(existing);

        let mut note = Note::new(board_id, created_by);
        note.color = random_color();
        note.position_x = position.x;
        note.position_y = position.y;
        note.category = Some(profile.default_category.to_string());
        note.note_type = Some(profile.default_note_type.to_string());

        let mut patch = draft.into_patch();
        if is_blank(&patch.category) {
            patch.category = None;
        }
        if is_blank(&patch.note_type) {
            patch.note_type = None;
        }
        note.apply_patch(&patch);

        let created = self.repo.create_note(&note).map_err(|err| {
            error!(
                "event=note_create module=service status=error error_code={} error={err}",
                err.code()
            );
            NoteServiceError::from(err)
        })?;
        info!(
            "event=note_create module=service status=ok note_id={} board_id={board_id}",
            created.id
        );
        Ok(created)
    }

    pub fn update_note(&self, id: NoteId, patch: &NotePatch) -> Result<Note, NoteServiceError> {
        Ok(self.repo.update_note(id, patch)?)
    }

    /// Soft-deletes the note by setting `is_archived`.
    pub fn archive_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.update_note(id, &NotePatch::archived(true))
    }

    pub fn restore_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.update_note(id, &NotePatch::archived(false))
    }

    /// Hard delete.
    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        Ok(self.repo.delete_note(id)?)
    }

    /// Persists a canvas position, clamped to the canvas bounds.
    pub fn move_note(&self, id: NoteId, position: Point) -> Result<Note, NoteServiceError> {
        let position = clamp_position(position);
        self.update_note(id, &NotePatch::position(position.x, position.y))
    }

    /// Applies one assistant suggestion. Returns the updated note, or `None`
    /// after a delete.
    pub fn apply_suggestion(
        &self,
        suggestion: &Suggestion,
    ) -> Result<Option<Note>, NoteServiceError> {
        let result = match suggestion {
            Suggestion::Update {
                note_id, changes, ..
            } => self.update_note(*note_id, changes).map(Some),
            Suggestion::Archive { note_id, .. } => self.archive_note(*note_id).map(Some),
            Suggestion::Delete { note_id, .. } => self.delete_note(*note_id).map(|_| None),
        };
        match &result {
            Ok(_) => info!(
                "event=ai_apply module=service status=ok action={} note_id={}",
                suggestion.action(),
                suggestion.note_id()
            ),
            Err(err) => error!(
                "event=ai_apply module=service status=error action={} note_id={} error_code={}",
                suggestion.action(),
                suggestion.note_id(),
                err.code()
            ),
        }
        result
    }

    /// Applies suggestions one after another, counting failures.
    pub fn apply_all(&self, suggestions: &[Suggestion]) -> BulkApplyOutcome {
        let mut outcome = BulkApplyOutcome::default();
        for suggestion in suggestions {
            match self.apply_suggestion(suggestion) {
                Ok(_) => outcome.applied += 1,
                Err(_) => outcome.failed += 1,
            }
        }
        if outcome.failed > 0 {
            warn!(
                "event=ai_apply_all module=service status=error applied={} failed={}",
                outcome.applied, outcome.failed
            );
        }
        outcome
    }

    /// Draws an edge from `source` to `target`.
    pub fn add_connection(
        &self,
        source: NoteId,
        target: NoteId,
        kind: ConnectionKind,
        delay: bool,
    ) -> Result<Note, NoteServiceError> {
        if source == target {
            return Err(NoteServiceError::InvalidConnection(
                NoteValidationError::SelfConnection,
            ));
        }
        let note = self.get_note(source)?;
        if note.connection_to(target).is_some() {
            return Err(NoteServiceError::InvalidConnection(
                NoteValidationError::DuplicateConnection(target),
            ));
        }
        self.get_note(target)?;

        let mut connections = note.connections;
        connections.push(NoteConnection {
            target_id: target,
            kind,
            delay,
        });
        self.update_note(
            source,
            &NotePatch {
                connections: Some(connections),
                ..NotePatch::default()
            },
        )
    }

    /// Removes the edge towards `target`; a missing edge is a no-op.
    pub fn remove_connection(
        &self,
        source: NoteId,
        target: NoteId,
    ) -> Result<Note, NoteServiceError> {
        let note = self.get_note(source)?;
        if note.connection_to(target).is_none() {
            return Ok(note);
        }
        let connections = note
            .connections
            .into_iter()
            .filter(|connection| connection.target_id != target)
            .collect();
        self.update_note(
            source,
            &NotePatch {
                connections: Some(connections),
                ..NotePatch::default()
            },
        )
    }

    /// Uploads a file and attaches it; the kind follows the MIME type.
    pub fn upload_attachment(
        &self,
        id: NoteId,
        uploader: &dyn FileUploader,
        request: &UploadRequest,
    ) -> Result<Note, NoteServiceError> {
        let note = self.get_note(id)?;
        let uploaded = uploader.upload(request).map_err(|err| {
            error!(
                "event=file_upload module=service status=error note_id={id} error_code={}",
                err.code()
            );
            err
        })?;
        self.push_attachment(
            note,
            Attachment {
                id: Uuid::new_v4(),
                kind: AttachmentKind::from_mime(&request.mime_type),
                url: uploaded.file_url,
                name: request.file_name.trim().to_string(),
            },
        )
    }

    /// Attaches a web link named after its host.
    pub fn add_link_attachment(&self, id: NoteId, url: &str) -> Result<Note, NoteServiceError> {
        let url = url.trim();
        let host = link_host(url).ok_or_else(|| NoteServiceError::InvalidLink(url.to_string()))?;
        let note = self.get_note(id)?;
        self.push_attachment(
            note,
            Attachment {
                id: Uuid::new_v4(),
                kind: AttachmentKind::Link,
                url: url.to_string(),
                name: host,
            },
        )
    }

    pub fn remove_attachment(
        &self,
        id: NoteId,
        attachment_id: Uuid,
    ) -> Result<Note, NoteServiceError> {
        let note = self.get_note(id)?;
        let attachments = note
            .attachments
            .into_iter()
            .filter(|attachment| attachment.id != attachment_id)
            .collect();
        self.update_note(
            id,
            &NotePatch {
                attachments: Some(attachments),
                ..NotePatch::default()
            },
        )
    }

    fn push_attachment(
        &self,
        note: Note,
        attachment: Attachment,
    ) -> Result<Note, NoteServiceError> {
        let mut attachments = note.attachments;
        attachments.push(attachment);
        self.update_note(
            note.id,
            &NotePatch {
                attachments: Some(attachments),
                ..NotePatch::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{grid_position, link_host, NoteService, NoteServiceError};
    use crate::ai::suggestion::Suggestion;
    use crate::audience::AudienceMode;
    use crate::db::open_db_in_memory;
    use crate::drag::Point;
    use crate::integration::{LocalUploader, UploadRequest};
    use crate::model::board::Board;
    use crate::model::note::{
        AttachmentKind, ConnectionKind, NoteDraft, NotePatch, NoteValidationError, Priority,
    };
    use crate::repo::{BoardRepository, SqliteBoardRepository, SqliteNoteRepository};
    use rusqlite::Connection;
    use uuid::Uuid;

    const EMAIL: &str = "tester@example.com";

    fn seed_board(conn: &Connection) -> Board {
        SqliteBoardRepository::new(conn)
            .create_board(&Board::new("Roadmap", EMAIL))
            .unwrap()
    }

    #[test]
    fn grid_wraps_after_five_columns() {
        assert_eq!(grid_position(0), Point::new(50.0, 120.0));
        assert_eq!(grid_position(4), Point::new(1250.0, 120.0));
        assert_eq!(grid_position(5), Point::new(50.0, 360.0));
    }

    #[test]
    fn link_host_extracts_host() {
        assert_eq!(
            link_host("https://Docs.Example.com:8080/path?q=1").as_deref(),
            Some("docs.example.com")
        );
        assert_eq!(link_host("not a url"), None);
    }

    #[test]
    fn create_note_applies_audience_defaults_and_grid() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));

        let first = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Student)
            .unwrap();
        let second = service
            .create_note(
                board.id,
                EMAIL,
                NoteDraft {
                    title: "Essay".to_string(),
                    category: Some("assignment".to_string()),
                    ..NoteDraft::default()
                },
                AudienceMode::Student,
            )
            .unwrap();

        assert_eq!(first.category.as_deref(), Some("subject_notes"));
        assert_eq!(first.note_type.as_deref(), Some("study_note"));
        assert_eq!((first.position_x, first.position_y), (50.0, 120.0));
        assert_eq!(second.category.as_deref(), Some("assignment"));
        assert_eq!((second.position_x, second.position_y), (350.0, 120.0));
    }

    #[test]
    fn blank_category_and_type_keep_audience_defaults() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));

        let note = service
            .create_note(
                board.id,
                EMAIL,
                NoteDraft {
                    title: "Standup".to_string(),
                    category: Some(String::new()),
                    note_type: Some("  ".to_string()),
                    ..NoteDraft::default()
                },
                AudienceMode::Professional,
            )
            .unwrap();

        assert_eq!(note.category.as_deref(), Some("work"));
        assert_eq!(note.note_type.as_deref(), Some("task"));
    }

    #[test]
    fn owned_note_hides_other_users_notes() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));
        let note = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Professional)
            .unwrap();

        assert_eq!(
            service
                .owned_note(note.id, "Tester@Example.com")
                .unwrap()
                .id,
            note.id
        );
        assert!(matches!(
            service.owned_note(note.id, "intruder@example.com"),
            Err(NoteServiceError::NoteNotFound(id)) if id == note.id
        ));
    }

    #[test]
    fn move_note_clamps_to_canvas() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));
        let note = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Professional)
            .unwrap();

        let moved = service.move_note(note.id, Point::new(-20.0, 10.0)).unwrap();
        assert_eq!((moved.position_x, moved.position_y), (0.0, 80.0));
    }

    #[test]
    fn apply_all_counts_failures_and_continues() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));
        let note = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Professional)
            .unwrap();

        let outcome = service.apply_all(&[
            Suggestion::Delete {
                note_id: Uuid::new_v4(),
                reason: "gone".to_string(),
            },
            Suggestion::Update {
                note_id: note.id,
                changes: NotePatch {
                    priority: Some(Priority::Urgent),
                    ..NotePatch::default()
                },
                reason: "deadline".to_string(),
            },
        ]);

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(service.get_note(note.id).unwrap().priority, Priority::Urgent);
    }

    #[test]
    fn connections_reject_self_and_duplicates() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));
        let a = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Professional)
            .unwrap();
        let b = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Professional)
            .unwrap();

        let err = service
            .add_connection(a.id, a.id, ConnectionKind::Reinforcing, false)
            .unwrap_err();
        assert!(matches!(
            err,
            NoteServiceError::InvalidConnection(NoteValidationError::SelfConnection)
        ));

        let linked = service
            .add_connection(a.id, b.id, ConnectionKind::Balancing, true)
            .unwrap();
        assert_eq!(linked.connections.len(), 1);
        assert!(service
            .add_connection(a.id, b.id, ConnectionKind::Reinforcing, false)
            .is_err());

        let unlinked = service.remove_connection(a.id, b.id).unwrap();
        assert!(unlinked.connections.is_empty());
    }

    #[test]
    fn attachments_upload_link_and_remove() {
        let conn = open_db_in_memory().unwrap();
        let board = seed_board(&conn);
        let service = NoteService::new(SqliteNoteRepository::new(&conn));
        let note = service
            .create_note(board.id, EMAIL, NoteDraft::default(), AudienceMode::Professional)
            .unwrap();

        let with_file = service
            .upload_attachment(
                note.id,
                &LocalUploader,
                &UploadRequest {
                    file_name: "diagram.png".to_string(),
                    mime_type: "image/png".to_string(),
                    bytes: vec![0; 4],
                },
            )
            .unwrap();
        assert_eq!(with_file.attachments[0].kind, AttachmentKind::Image);
        assert_eq!(with_file.attachments[0].url, "mock-file-url/diagram.png");

        let with_link = service
            .add_link_attachment(note.id, "https://rust-lang.org/learn")
            .unwrap();
        assert_eq!(with_link.attachments[1].name, "rust-lang.org");

        let removed = service
            .remove_attachment(note.id, with_link.attachments[0].id)
            .unwrap();
        assert_eq!(removed.attachments.len(), 1);
        assert_eq!(removed.attachments[0].kind, AttachmentKind::Link);
    }
}
