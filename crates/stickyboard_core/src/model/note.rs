//! Sticky note record and its classification vocabulary.
//!
//! # Responsibility
//! - Define the canonical note shape shared by every view mode.
//! - Apply partial patches (the only mutation path) and validate the result.
//!
//! # Invariants
//! - `is_archived` is the source of truth for soft deletion.
//! - `width`/`height` are finite and positive; positions are finite.
//! - A note never connects to itself and holds at most one edge per target.
//! - Blank optional text fields are stored as `None`.

use crate::model::board::BoardId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type NoteId = Uuid;

pub const DEFAULT_NOTE_WIDTH: f64 = 280.0;
pub const DEFAULT_NOTE_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteColor {
    Yellow,
    Blue,
    Green,
    Pink,
    Purple,
    Orange,
}

impl NoteColor {
    /// Palette new notes draw their color from.
    pub const ALL: [NoteColor; 6] = [
        Self::Yellow,
        Self::Blue,
        Self::Green,
        Self::Pink,
        Self::Purple,
        Self::Orange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Display order, most pressing first.
    pub const ALL: [Priority; 4] = [Self::Urgent, Self::High, Self::Medium, Self::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == value)
    }

    /// `urgent` and `high` both count as urgent in the matrix views.
    pub fn is_pressing(self) -> bool {
        matches!(self, Self::Urgent | Self::High)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    #[default]
    Active,
    InProgress,
    Waiting,
    Completed,
    OnHold,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 5] = [
        Self::Active,
        Self::InProgress,
        Self::Waiting,
        Self::Completed,
        Self::OnHold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Waiting => "waiting",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// Feedback-loop polarity drawn between two notes in the connections view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    #[default]
    Reinforcing,
    Balancing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteConnection {
    #[serde(rename = "targetId")]
    pub target_id: NoteId,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    /// Rendered as a `||` delay mark on the edge.
    pub delay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    File,
    Link,
}

impl AttachmentKind {
    /// Maps an uploaded file's MIME type onto an attachment kind.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else {
            Self::File
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
}

/// Canonical sticky note record.
///
/// Position and size only matter on the freeform canvas; the grouped views
/// ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub board_id: BoardId,
    pub title: String,
    /// Rich text (HTML) produced by the editor.
    pub content: String,
    pub color: NoteColor,
    pub priority: Priority,
    pub status: NoteStatus,
    pub category: Option<String>,
    pub project: Option<String>,
    pub assigned_to: Option<String>,
    pub note_type: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub is_archived: bool,
    pub connections: Vec<NoteConnection>,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Email of the creating user.
    pub created_by: String,
    pub created_date: i64,
    pub updated_date: i64,
}

impl Note {
    /// Creates an unsaved note on `board_id` with default classification.
    pub fn new(board_id: BoardId, created_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            title: String::new(),
            content: String::new(),
            color: NoteColor::Yellow,
            priority: Priority::default(),
            status: NoteStatus::default(),
            category: None,
            project: None,
            assigned_to: None,
            note_type: None,
            due_date: None,
            position_x: 0.0,
            position_y: 0.0,
            width: DEFAULT_NOTE_WIDTH,
            height: DEFAULT_NOTE_HEIGHT,
            is_archived: false,
            connections: Vec::new(),
            tags: Vec::new(),
            attachments: Vec::new(),
            created_by: created_by.into(),
            created_date: 0,
            updated_date: 0,
        }
    }

    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    /// Whether the note shows up in default (non-archive) listings.
    pub fn is_active(&self) -> bool {
        !self.is_archived
    }

    pub fn connection_to(&self, target_id: NoteId) -> Option<&NoteConnection> {
        self.connections
            .iter()
            .find(|connection| connection.target_id == target_id)
    }

    /// Applies every field set on `patch`; untouched fields keep their value.
    pub fn apply_patch(&mut self, patch: &NotePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(board_id) = patch.board_id {
            self.board_id = board_id;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(category) = &patch.category {
            self.category = non_blank(category.as_deref());
        }
        if let Some(project) = &patch.project {
            self.project = non_blank(project.as_deref());
        }
        if let Some(assigned_to) = &patch.assigned_to {
            self.assigned_to = non_blank(assigned_to.as_deref());
        }
        if let Some(note_type) = &patch.note_type {
            self.note_type = non_blank(note_type.as_deref());
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(x) = patch.position_x {
            self.position_x = x;
        }
        if let Some(y) = patch.position_y {
            self.position_y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(connections) = &patch.connections {
            self.connections = connections.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(attachments) = &patch.attachments {
            self.attachments = attachments.clone();
        }
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        if !self.position_x.is_finite() || !self.position_y.is_finite() {
            return Err(NoteValidationError::NonFinitePosition);
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(NoteValidationError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }

        let mut targets = HashSet::new();
        for connection in &self.connections {
            if connection.target_id == self.id {
                return Err(NoteValidationError::SelfConnection);
            }
            if !targets.insert(connection.target_id) {
                return Err(NoteValidationError::DuplicateConnection(
                    connection.target_id,
                ));
            }
        }
        Ok(())
    }
}

/// Partial update applied through the entity client.
///
/// Nullable fields use `Option<Option<_>>`: the outer `None` leaves the field
/// untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NoteStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<NoteConnection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn archived(is_archived: bool) -> Self {
        Self {
            is_archived: Some(is_archived),
            ..Self::default()
        }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position_x: Some(x),
            position_y: Some(y),
            ..Self::default()
        }
    }
}

/// Editable fields of the focus editor, used for both create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub status: NoteStatus,
    pub priority: Priority,
    pub project: Option<String>,
    pub assigned_to: Option<String>,
    pub note_type: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl NoteDraft {
    pub fn into_patch(self) -> NotePatch {
        NotePatch {
            title: Some(self.title),
            content: Some(self.content),
            priority: Some(self.priority),
            status: Some(self.status),
            category: Some(self.category),
            project: Some(self.project),
            assigned_to: Some(self.assigned_to),
            note_type: Some(self.note_type),
            due_date: Some(self.due_date),
            ..NotePatch::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoteValidationError {
    NilId,
    NonFinitePosition,
    InvalidSize { width: f64, height: f64 },
    SelfConnection,
    DuplicateConnection(NoteId),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "note id must not be nil"),
            Self::NonFinitePosition => write!(f, "note position must be finite"),
            Self::InvalidSize { width, height } => {
                write!(f, "note size must be positive, got {width}x{height}")
            }
            Self::SelfConnection => write!(f, "note cannot connect to itself"),
            Self::DuplicateConnection(target) => {
                write!(f, "note already connects to {target}")
            }
        }
    }
}

impl Error for NoteValidationError {}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_patch_clears_blank_optional_fields() {
        let mut note = Note::new(Uuid::new_v4(), "tester@example.com");
        note.project = Some("Apollo".to_string());

        note.apply_patch(&NotePatch {
            project: Some(Some("   ".to_string())),
            category: Some(Some(" work ".to_string())),
            ..NotePatch::default()
        });

        assert_eq!(note.project, None);
        assert_eq!(note.category.as_deref(), Some("work"));
    }

    #[test]
    fn archived_note_is_not_active() {
        let mut note = Note::new(Uuid::new_v4(), "tester@example.com");
        assert!(note.is_active());
        note.archive();
        assert!(!note.is_active());
    }

    #[test]
    fn validate_rejects_self_connection() {
        let mut note = Note::new(Uuid::new_v4(), "tester@example.com");
        note.connections.push(NoteConnection {
            target_id: note.id,
            kind: ConnectionKind::Reinforcing,
            delay: false,
        });
        assert_eq!(note.validate(), Err(NoteValidationError::SelfConnection));
    }

    #[test]
    fn validate_rejects_zero_width() {
        let mut note = Note::new(Uuid::new_v4(), "tester@example.com");
        note.width = 0.0;
        assert!(matches!(
            note.validate(),
            Err(NoteValidationError::InvalidSize { .. })
        ));
    }

    #[test]
    fn attachment_kind_follows_mime_prefix() {
        assert_eq!(AttachmentKind::from_mime("image/png"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_mime("Video/MP4"), AttachmentKind::Video);
        assert_eq!(AttachmentKind::from_mime("audio/ogg"), AttachmentKind::Audio);
        assert_eq!(
            AttachmentKind::from_mime("application/pdf"),
            AttachmentKind::File
        );
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(NotePatch::default().is_empty());
        assert!(!NotePatch::archived(true).is_empty());
    }
}
