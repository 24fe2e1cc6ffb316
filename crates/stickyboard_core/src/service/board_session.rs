//! Board page state.
//!
//! # Responsibility
//! - Hold the opened board, its active notes and the cross-board AI context.
//! - Keep both note lists in sync with every write made from the page.
//! - Drive the drag positioner and persist its commits.
//! - Render the filtered view layout for the active view mode.
//!
//! # Invariants
//! - `notes` holds exactly the active notes of `board`; `context_notes` holds
//!   the user's active notes on every board. Archived notes are in neither.
//! - Only views that use canvas positions accept drags.

use crate::ai::assistant::{AiAssistant, AssistantError, ChatMessage};
use crate::ai::categorize::{categorize_notes, CategorySuggestion};
use crate::ai::suggestion::Suggestion;
use crate::audience::AudienceMode;
use crate::drag::{DragPositioner, Point, PointerId, PressTarget};
use crate::integration::LlmProvider;
use crate::model::board::{Board, BoardId};
use crate::model::note::{Note, NoteDraft, NoteId, NotePatch};
use crate::model::user::User;
use crate::repo::{
    BoardFilter, BoardRepository, NoteRepository, PreferenceStore, Preferences, SortSpec,
};
use crate::service::app_state::{Page, SessionError};
use crate::service::note_service::{BulkApplyOutcome, NoteService, NoteServiceError};
use crate::view::{
    apply_filters, layout, view_stats, DecisionQuadrant, EisenhowerQuadrant, QuickFilter,
    ViewContext, ViewLayout, ViewMode, ViewStats,
};
use chrono::NaiveDate;
use log::{info, warn};

pub struct BoardSession<N: NoteRepository> {
    board: Board,
    boards: Vec<Board>,
    user_email: String,
    audience: AudienceMode,
    notes_service: NoteService<N>,
    notes: Vec<Note>,
    context_notes: Vec<Note>,
    drag: DragPositioner,
    view_mode: ViewMode,
    search: String,
    quick_filter: Option<QuickFilter>,
}

impl<N: NoteRepository> BoardSession<N> {
    /// Opens the board page for `board_id`.
    ///
    /// A missing id, unknown board or foreign board redirects to `Boards`.
    pub fn open<B: BoardRepository, S: PreferenceStore>(
        boards: &B,
        notes: N,
        prefs: &Preferences<S>,
        user: &User,
        audience: AudienceMode,
        board_id: Option<BoardId>,
    ) -> Result<Self, SessionError> {
        let Some(board_id) = board_id else {
            return Err(SessionError::Redirect(Page::Boards));
        };
        let owned = boards.filter_boards(
            &BoardFilter::owned_by(user.email.as_str()),
            Some(&SortSpec::NEWEST_FIRST),
        )?;
        let Some(board) = owned.iter().find(|board| board.id == board_id).cloned() else {
            warn!(
                "event=board_open module=service status=redirect board_id={board_id} error_code=board_not_found"
            );
            return Err(SessionError::Redirect(Page::Boards));
        };
        prefs.set_last_board_id(board.id)?;

        let mut session = Self {
            board,
            boards: owned,
            user_email: user.email.clone(),
            audience,
            notes_service: NoteService::new(notes),
            notes: Vec::new(),
            context_notes: Vec::new(),
            drag: DragPositioner::new(),
            view_mode: ViewMode::default(),
            search: String::new(),
            quick_filter: None,
        };
        session.reload()?;
        info!(
            "event=board_open module=service status=ok board_id={} note_count={}",
            session.board.id,
            session.notes.len()
        );
        Ok(session)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Active notes of the board, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Active notes across every board, as handed to the assistant.
    pub fn context_notes(&self) -> &[Note] {
        &self.context_notes
    }

    pub fn note_service(&self) -> &NoteService<N> {
        &self.notes_service
    }

    pub fn audience(&self) -> AudienceMode {
        self.audience
    }

    pub fn set_audience(&mut self, audience: AudienceMode) {
        self.audience = audience;
    }

    /// Re-reads both note lists.
    pub fn reload(&mut self) -> Result<(), NoteServiceError> {
        self.notes = self.notes_service.board_notes(self.board.id)?;
        self.context_notes = self.notes_service.active_notes_of(&self.user_email)?;
        Ok(())
    }

    pub fn create_note(&mut self, draft: NoteDraft) -> Result<&Note, NoteServiceError> {
        let note = self
            .notes_service
            .create_note(self.board.id, &self.user_email, draft, self.audience)?;
        self.context_notes.insert(0, note.clone());
        self.notes.insert(0, note);
        Ok(&self.notes[0])
    }

    pub fn update_note(&mut self, id: NoteId, patch: &NotePatch) -> Result<Note, NoteServiceError> {
        let note = self.notes_service.update_note(id, patch)?;
        self.sync(&note);
        Ok(note)
    }

    pub fn archive_note(&mut self, id: NoteId) -> Result<Note, NoteServiceError> {
        let note = self.notes_service.archive_note(id)?;
        self.forget(id);
        Ok(note)
    }

    pub fn delete_note(&mut self, id: NoteId) -> Result<(), NoteServiceError> {
        self.notes_service.delete_note(id)?;
        self.forget(id);
        Ok(())
    }

    /// Applies one assistant suggestion and reloads both lists.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> Result<(), NoteServiceError> {
        let result = self.notes_service.apply_suggestion(suggestion).map(|_| ());
        self.reload()?;
        result
    }

    pub fn apply_all(
        &mut self,
        suggestions: &[Suggestion],
    ) -> Result<BulkApplyOutcome, NoteServiceError> {
        let outcome = self.notes_service.apply_all(suggestions);
        self.reload()?;
        Ok(outcome)
    }

    /// Heuristic category suggestions for every note on the board.
    pub fn categorize(&self) -> Vec<CategorySuggestion> {
        categorize_notes(&self.notes, self.audience)
    }

    pub fn apply_categories(
        &mut self,
        suggestions: &[CategorySuggestion],
    ) -> Result<BulkApplyOutcome, NoteServiceError> {
        let mut outcome = BulkApplyOutcome::default();
        for suggestion in suggestions {
            match self
                .notes_service
                .update_note(suggestion.note_id, &suggestion.to_patch())
            {
                Ok(_) => outcome.applied += 1,
                Err(err) => {
                    warn!(
                        "event=categorize_apply module=service status=error note_id={} error_code={}",
                        suggestion.note_id,
                        err.code()
                    );
                    outcome.failed += 1;
                }
            }
        }
        self.reload()?;
        Ok(outcome)
    }

    /// Sends `input` to the assistant with every active note as context.
    pub fn ask_assistant<'a>(
        &self,
        assistant: &'a mut AiAssistant,
        input: &str,
        llm: &dyn LlmProvider,
    ) -> Result<&'a ChatMessage, AssistantError> {
        assistant.send(input, &self.context_notes, &self.boards, llm)
    }

    /// Drops a board note on an Eisenhower quadrant.
    pub fn drop_on_eisenhower(
        &mut self,
        id: NoteId,
        quadrant: EisenhowerQuadrant,
    ) -> Result<Note, NoteServiceError> {
        self.ensure_on_board(id)?;
        self.update_note(id, &quadrant.drop_patch())
    }

    pub fn drop_on_decision(
        &mut self,
        id: NoteId,
        quadrant: DecisionQuadrant,
    ) -> Result<Note, NoteServiceError> {
        self.ensure_on_board(id)?;
        self.update_note(id, &quadrant.drop_patch())
    }

    /// Starts dragging `note_id`; `false` when the press does not start a drag.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        note_id: NoteId,
        at: Point,
        target: PressTarget,
    ) -> bool {
        if !self.view_mode.uses_positions() {
            return false;
        }
        match self.notes.iter().find(|note| note.id == note_id) {
            Some(note) => self.drag.pointer_down(pointer, note, at, target),
            None => false,
        }
    }

    /// Moves the dragged card in memory only.
    pub fn pointer_move(&mut self, pointer: PointerId, at: Point) -> Option<Point> {
        let (note_id, position) = self.drag.pointer_move(pointer, at)?;
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == note_id) {
            note.position_x = position.x;
            note.position_y = position.y;
        }
        Some(position)
    }

    /// Ends the drag and persists the last in-memory position.
    ///
    /// A failed save drops the unsaved position: a vanished note leaves both
    /// lists, anything else reloads them from the store.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Result<Option<Note>, NoteServiceError> {
        let Some(commit) = self.drag.pointer_up(pointer) else {
            return Ok(None);
        };
        match self.notes_service.move_note(commit.note_id, commit.position) {
            Ok(note) => {
                self.sync(&note);
                Ok(Some(note))
            }
            Err(err) => {
                warn!(
                    "event=drag_commit module=service status=error note_id={} error_code={}",
                    commit.note_id,
                    err.code()
                );
                if matches!(err, NoteServiceError::NoteNotFound(_)) {
                    self.forget(commit.note_id);
                } else if let Err(reload_err) = self.reload() {
                    warn!(
                        "event=board_reload module=service status=error board_id={} error_code={}",
                        self.board.id,
                        reload_err.code()
                    );
                }
                Err(err)
            }
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    pub fn set_quick_filter(&mut self, filter: Option<QuickFilter>) {
        self.quick_filter = filter;
    }

    /// Board notes after search and quick filter.
    pub fn visible_notes(&self, today: NaiveDate) -> Vec<Note> {
        apply_filters(&self.notes, &self.search, self.quick_filter, today)
    }

    pub fn stats(&self, today: NaiveDate) -> ViewStats {
        view_stats(&self.visible_notes(today), self.view_mode, self.audience)
    }

    /// Renders the active view over the visible notes.
    pub fn render<T>(&self, today: NaiveDate, render: impl FnOnce(&ViewLayout<'_>) -> T) -> T {
        let visible = self.visible_notes(today);
        let context = ViewContext {
            audience: self.audience,
            today,
        };
        render(&layout(&visible, self.view_mode, &context))
    }

    fn sync(&mut self, note: &Note) {
        if !note.is_active() {
            self.forget(note.id);
            return;
        }
        if note.board_id == self.board.id {
            replace_or_insert(&mut self.notes, note);
        } else {
            self.notes.retain(|existing| existing.id != note.id);
        }
        replace_or_insert(&mut self.context_notes, note);
    }

    fn ensure_on_board(&self, id: NoteId) -> Result<(), NoteServiceError> {
        if self.notes.iter().any(|note| note.id == id) {
            Ok(())
        } else {
            Err(NoteServiceError::NoteNotFound(id))
        }
    }

    fn forget(&mut self, id: NoteId) {
        self.notes.retain(|note| note.id != id);
        self.context_notes.retain(|note| note.id != id);
    }
}

fn replace_or_insert(notes: &mut Vec<Note>, note: &Note) {
    match notes.iter_mut().find(|existing| existing.id == note.id) {
        Some(existing) => *existing = note.clone(),
        None => notes.insert(0, note.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::BoardSession;
    use crate::audience::AudienceMode;
    use crate::db::open_db_in_memory;
    use crate::drag::{Point, PressTarget};
    use crate::model::board::Board;
    use crate::model::note::{NoteDraft, NoteStatus, Priority};
    use crate::model::user::User;
    use crate::repo::{
        BoardRepository, MemoryPreferenceStore, Preferences, SqliteBoardRepository,
        SqliteNoteRepository,
    };
    use crate::service::app_state::{Page, SessionError};
    use crate::service::note_service::NoteServiceError;
    use crate::view::{EisenhowerQuadrant, ViewMode};
    use uuid::Uuid;

    #[test]
    fn unknown_board_redirects_to_boards() {
        let conn = open_db_in_memory().unwrap();
        let prefs = Preferences::new(MemoryPreferenceStore::new());
        let user = User::new("tester@example.com");

        for board_id in [None, Some(Uuid::new_v4())] {
            let result = BoardSession::open(
                &SqliteBoardRepository::new(&conn),
                SqliteNoteRepository::new(&conn),
                &prefs,
                &user,
                AudienceMode::Professional,
                board_id,
            );
            assert!(matches!(result, Err(SessionError::Redirect(Page::Boards))));
        }
    }

    #[test]
    fn drag_is_ignored_outside_freeform() {
        let conn = open_db_in_memory().unwrap();
        let prefs = Preferences::new(MemoryPreferenceStore::new());
        let user = User::new("tester@example.com");
        let board = SqliteBoardRepository::new(&conn)
            .create_board(&Board::new("Canvas", user.email.as_str()))
            .unwrap();
        let mut session = BoardSession::open(
            &SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
            &prefs,
            &user,
            AudienceMode::Professional,
            Some(board.id),
        )
        .unwrap();
        let note_id = session.create_note(NoteDraft::default()).unwrap().id;

        session.set_view_mode(ViewMode::Priority);
        assert!(!session.pointer_down(1, note_id, Point::new(60.0, 130.0), PressTarget::Card));

        session.set_view_mode(ViewMode::Freeform);
        assert!(session.pointer_down(1, note_id, Point::new(60.0, 130.0), PressTarget::Card));
    }

    #[test]
    fn matrix_drop_only_accepts_notes_on_the_board() {
        let conn = open_db_in_memory().unwrap();
        let prefs = Preferences::new(MemoryPreferenceStore::new());
        let user = User::new("tester@example.com");
        let board = SqliteBoardRepository::new(&conn)
            .create_board(&Board::new("Matrix", user.email.as_str()))
            .unwrap();
        let mut session = BoardSession::open(
            &SqliteBoardRepository::new(&conn),
            SqliteNoteRepository::new(&conn),
            &prefs,
            &user,
            AudienceMode::Professional,
            Some(board.id),
        )
        .unwrap();
        let note_id = session.create_note(NoteDraft::default()).unwrap().id;

        let dropped = session
            .drop_on_eisenhower(note_id, EisenhowerQuadrant::Do)
            .unwrap();
        assert_eq!(dropped.priority, Priority::Urgent);
        assert_eq!(dropped.status, NoteStatus::InProgress);
        assert_eq!(session.notes()[0].priority, Priority::Urgent);

        let stranger = Uuid::new_v4();
        assert!(matches!(
            session.drop_on_eisenhower(stranger, EisenhowerQuadrant::Delete),
            Err(NoteServiceError::NoteNotFound(id)) if id == stranger
        ));
    }
}
