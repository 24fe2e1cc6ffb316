//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the full note record, including its JSON-encoded
//!   connections, tags and attachments.
//! - Apply partial patches as read-modify-write with last write winning.
//!
//! # Invariants
//! - Every write validates the resulting note first.
//! - `board_id` must reference an existing board (foreign key).
//! - Listing filters match exactly; `is_archived` is never implied, so callers
//!   ask for active or archived notes explicitly.

use super::{
    bool_to_int, int_to_bool, order_clause, parse_uuid, EntityKind, RepoError, RepoResult,
    SortSpec,
};
use crate::model::board::BoardId;
use crate::model::note::{Note, NoteColor, NoteId, NotePatch, NoteStatus, Priority};
use crate::model::now_epoch_ms;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    board_id,
    title,
    content,
    color,
    priority,
    status,
    category,
    project,
    assigned_to,
    note_type,
    due_date,
    position_x,
    position_y,
    width,
    height,
    is_archived,
    connections,
    tags,
    attachments,
    created_by,
    created_date,
    updated_date
FROM notes";

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Exact-match predicate for note listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub board_id: Option<BoardId>,
    pub created_by: Option<String>,
    pub is_archived: Option<bool>,
}

impl NoteFilter {
    /// Active notes on one board.
    pub fn active_on_board(board_id: BoardId) -> Self {
        Self {
            board_id: Some(board_id),
            is_archived: Some(false),
            ..Self::default()
        }
    }

    /// Active notes across every board.
    pub fn active() -> Self {
        Self {
            is_archived: Some(false),
            ..Self::default()
        }
    }

    /// Archived notes created by `email`.
    pub fn archived_by(email: impl Into<String>) -> Self {
        Self {
            created_by: Some(email.into()),
            is_archived: Some(true),
            ..Self::default()
        }
    }
}

pub trait NoteRepository {
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    fn filter_notes(&self, filter: &NoteFilter, sort: Option<&SortSpec>) -> RepoResult<Vec<Note>>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn create_note(&self, note: &Note) -> RepoResult<Note>;
    fn update_note(&self, id: NoteId, patch: &NotePatch) -> RepoResult<Note>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.filter_notes(&NoteFilter::default(), None)
    }

    fn filter_notes(&self, filter: &NoteFilter, sort: Option<&SortSpec>) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(board_id) = filter.board_id {
            sql.push_str(" AND board_id = ?");
            bind_values.push(Value::Text(board_id.to_string()));
        }
        if let Some(created_by) = filter.created_by.as_ref() {
            sql.push_str(" AND created_by = ? COLLATE NOCASE");
            bind_values.push(Value::Text(created_by.clone()));
        }
        if let Some(is_archived) = filter.is_archived {
            sql.push_str(" AND is_archived = ?");
            bind_values.push(Value::Integer(bool_to_int(is_archived)));
        }
        sql.push_str(&order_clause(sort, "title"));
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn create_note(&self, note: &Note) -> RepoResult<Note> {
        note.validate()?;

        let mut stored = note.clone();
        let now = now_epoch_ms();
        stored.created_date = now;
        stored.updated_date = now;

        self.conn.execute(
            "INSERT INTO notes (
                id,
                board_id,
                title,
                content,
                color,
                priority,
                status,
                category,
                project,
                assigned_to,
                note_type,
                due_date,
                position_x,
                position_y,
                width,
                height,
                is_archived,
                connections,
                tags,
                attachments,
                created_by,
                created_date,
                updated_date
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23
            );",
            params![
                stored.id.to_string(),
                stored.board_id.to_string(),
                stored.title.as_str(),
                stored.content.as_str(),
                stored.color.as_str(),
                stored.priority.as_str(),
                stored.status.as_str(),
                stored.category.as_deref(),
                stored.project.as_deref(),
                stored.assigned_to.as_deref(),
                stored.note_type.as_deref(),
                due_date_to_db(stored.due_date),
                stored.position_x,
                stored.position_y,
                stored.width,
                stored.height,
                bool_to_int(stored.is_archived),
                to_json_column(&stored.connections)?,
                to_json_column(&stored.tags)?,
                to_json_column(&stored.attachments)?,
                stored.created_by.as_str(),
                stored.created_date,
                stored.updated_date,
            ],
        )?;
        Ok(stored)
    }

    fn update_note(&self, id: NoteId, patch: &NotePatch) -> RepoResult<Note> {
        let mut note = self.get_note(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Note,
            id,
        })?;
        note.apply_patch(patch);
        note.validate()?;
        note.updated_date = now_epoch_ms();

        self.conn.execute(
            "UPDATE notes
             SET
                board_id = ?2,
                title = ?3,
                content = ?4,
                color = ?5,
                priority = ?6,
                status = ?7,
                category = ?8,
                project = ?9,
                assigned_to = ?10,
                note_type = ?11,
                due_date = ?12,
                position_x = ?13,
                position_y = ?14,
                width = ?15,
                height = ?16,
                is_archived = ?17,
                connections = ?18,
                tags = ?19,
                attachments = ?20,
                updated_date = ?21
             WHERE id = ?1;",
            params![
                id.to_string(),
                note.board_id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.color.as_str(),
                note.priority.as_str(),
                note.status.as_str(),
                note.category.as_deref(),
                note.project.as_deref(),
                note.assigned_to.as_deref(),
                note.note_type.as_deref(),
                due_date_to_db(note.due_date),
                note.position_x,
                note.position_y,
                note.width,
                note.height,
                bool_to_int(note.is_archived),
                to_json_column(&note.connections)?,
                to_json_column(&note.tags)?,
                to_json_column(&note.attachments)?,
                note.updated_date,
            ],
        )?;
        Ok(note)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Note,
                id,
            });
        }
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let board_text: String = row.get("board_id")?;
    let color: String = row.get("color")?;
    let priority: String = row.get("priority")?;
    let status: String = row.get("status")?;
    let due_date: Option<String> = row.get("due_date")?;
    let connections: String = row.get("connections")?;
    let tags: String = row.get("tags")?;
    let attachments: String = row.get("attachments")?;

    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        board_id: parse_uuid(&board_text, "notes.board_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        color: NoteColor::parse(&color).ok_or_else(|| invalid_enum("color", &color))?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| invalid_enum("priority", &priority))?,
        status: NoteStatus::parse(&status).ok_or_else(|| invalid_enum("status", &status))?,
        category: row.get("category")?,
        project: row.get("project")?,
        assigned_to: row.get("assigned_to")?,
        note_type: row.get("note_type")?,
        due_date: due_date.as_deref().map(due_date_from_db).transpose()?,
        position_x: row.get("position_x")?,
        position_y: row.get("position_y")?,
        width: row.get("width")?,
        height: row.get("height")?,
        is_archived: int_to_bool(row.get("is_archived")?, "notes.is_archived")?,
        connections: from_json_column(&connections, "notes.connections")?,
        tags: from_json_column(&tags, "notes.tags")?,
        attachments: from_json_column(&attachments, "notes.attachments")?,
        created_by: row.get("created_by")?,
        created_date: row.get("created_date")?,
        updated_date: row.get("updated_date")?,
    })
}

fn invalid_enum(column: &str, value: &str) -> RepoError {
    RepoError::InvalidData(format!("invalid value `{value}` in notes.{column}"))
}

fn due_date_to_db(value: Option<NaiveDate>) -> Option<String> {
    value.map(|date| date.format(DUE_DATE_FORMAT).to_string())
}

fn due_date_from_db(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{value}` in notes.due_date"))
    })
}

fn to_json_column<T: Serialize>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode json column: {err}")))
}

fn from_json_column<T: DeserializeOwned>(value: &str, column: &str) -> RepoResult<T> {
    serde_json::from_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {column}: {err}")))
}
