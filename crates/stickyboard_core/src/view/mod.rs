//! View classifier: pure note-to-layout functions for every view mode.
//!
//! # Responsibility
//! - Map a note list plus a view mode onto the layout the board renders.
//! - Provide search, quick filters and per-view statistics.
//!
//! # Invariants
//! - Functions are pure: no I/O, no clock reads (callers pass `today`).
//! - Source insertion order is preserved inside every group; only the
//!   timeline applies a (stable) sort.
//! - Empty input yields empty groups, never an error.

pub mod connections;
pub mod filter;
pub mod group;
pub mod matrix;
pub mod timeline;

use crate::audience::AudienceMode;
use crate::model::note::Note;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use connections::{connection_graph, ConnectionEdge, ConnectionGraph};
pub use filter::{apply_filters, search_notes, view_stats, QuickFilter, ViewStats};
pub use group::{group_notes, group_title, NoteGroup};
pub use matrix::{
    decision_matrix, eisenhower_matrix, DecisionQuadrant, EisenhowerQuadrant, Quadrant,
};
pub use timeline::{timeline_buckets, timeline_entries, TimelineEntry, TimelineMarker};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Freeform,
    Category,
    Priority,
    Status,
    Timeline,
    Project,
    Owner,
    Type,
    Eisenhower,
    Decision,
    Connections,
}

impl ViewMode {
    pub const ALL: [ViewMode; 11] = [
        Self::Freeform,
        Self::Category,
        Self::Priority,
        Self::Status,
        Self::Timeline,
        Self::Project,
        Self::Owner,
        Self::Type,
        Self::Eisenhower,
        Self::Decision,
        Self::Connections,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Freeform => "freeform",
            Self::Category => "category",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::Timeline => "timeline",
            Self::Project => "project",
            Self::Owner => "owner",
            Self::Type => "type",
            Self::Eisenhower => "eisenhower",
            Self::Decision => "decision",
            Self::Connections => "connections",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }

    /// Only the freeform canvas honours note positions and dragging.
    pub fn uses_positions(self) -> bool {
        self == Self::Freeform
    }
}

/// Inputs the classifier needs besides the notes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    pub audience: AudienceMode,
    pub today: NaiveDate,
}

/// Rendered shape of one view mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum ViewLayout<'a> {
    Freeform { notes: Vec<&'a Note> },
    Grouped { groups: Vec<NoteGroup<'a>> },
    Timeline { entries: Vec<TimelineEntry<'a>> },
    Matrix { quadrants: Vec<Quadrant<'a>> },
    Connections { graph: ConnectionGraph<'a> },
}

impl ViewLayout<'_> {
    /// Number of notes placed in the layout.
    pub fn note_count(&self) -> usize {
        match self {
            Self::Freeform { notes } => notes.len(),
            Self::Grouped { groups } => groups.iter().map(|group| group.notes.len()).sum(),
            Self::Timeline { entries } => entries.len(),
            Self::Matrix { quadrants } => {
                quadrants.iter().map(|quadrant| quadrant.notes.len()).sum()
            }
            Self::Connections { graph } => graph.nodes.len(),
        }
    }
}

/// Classifies `notes` for `mode`.
pub fn layout<'a>(notes: &'a [Note], mode: ViewMode, context: &ViewContext) -> ViewLayout<'a> {
    match mode {
        ViewMode::Freeform => ViewLayout::Freeform {
            notes: notes.iter().collect(),
        },
        ViewMode::Timeline => ViewLayout::Timeline {
            entries: timeline_entries(notes, context.today),
        },
        ViewMode::Eisenhower => ViewLayout::Matrix {
            quadrants: eisenhower_matrix(notes, context.audience),
        },
        ViewMode::Decision => ViewLayout::Matrix {
            quadrants: decision_matrix(notes, context.audience),
        },
        ViewMode::Connections => ViewLayout::Connections {
            graph: connection_graph(notes),
        },
        ViewMode::Category
        | ViewMode::Priority
        | ViewMode::Status
        | ViewMode::Project
        | ViewMode::Owner
        | ViewMode::Type => ViewLayout::Grouped {
            groups: group_notes(notes, mode, context.audience),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{layout, ViewContext, ViewLayout, ViewMode};
    use crate::audience::AudienceMode;
    use chrono::NaiveDate;

    #[test]
    fn view_mode_parse_covers_all_modes() {
        for mode in ViewMode::ALL {
            assert_eq!(ViewMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(ViewMode::parse("kanban"), None);
    }

    #[test]
    fn empty_input_yields_empty_layouts() {
        let context = ViewContext {
            audience: AudienceMode::Professional,
            today: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        for mode in ViewMode::ALL {
            let rendered = layout(&[], mode, &context);
            assert_eq!(rendered.note_count(), 0, "mode {}", mode.as_str());
        }
        assert!(matches!(
            layout(&[], ViewMode::Priority, &context),
            ViewLayout::Grouped { groups } if groups.len() == 4
        ));
    }
}
