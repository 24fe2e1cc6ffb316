//! Freeform-canvas drag positioner.
//!
//! # Responsibility
//! - Track per-pointer Idle/Dragging state for note cards.
//! - Compute clamped in-memory positions while dragging and hand back the
//!   final position on release so the caller can persist it.
//!
//! # Invariants
//! - Presses on interactive sub-elements (buttons, inputs, menus) never start
//!   a drag.
//! - A note is dragged by at most one pointer at a time.
//! - Positions are clamped to `x >= MIN_X` and `y >= MIN_Y`.
//! - There is no cancel transition; only pointer-up leaves Dragging.

use crate::model::note::{Note, NoteId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Left edge of the canvas.
pub const MIN_X: f64 = 0.0;
/// Keeps cards below the board toolbar.
pub const MIN_Y: f64 = 80.0;

pub type PointerId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What the pointer landed on when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Card,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { note_id: NoteId, position: Point },
}

/// Final position to write back through the entity client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragCommit {
    pub note_id: NoteId,
    pub position: Point,
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    note_id: NoteId,
    offset: Point,
    position: Point,
}

#[derive(Debug, Default)]
pub struct DragPositioner {
    sessions: BTreeMap<PointerId, DragSession>,
}

impl DragPositioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Dragging. Returns `false` when the press does not start a drag.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        note: &Note,
        at: Point,
        target: PressTarget,
    ) -> bool {
        if target == PressTarget::Interactive
            || self.sessions.contains_key(&pointer)
            || self.is_dragging(note.id)
        {
            return false;
        }

        self.sessions.insert(
            pointer,
            DragSession {
                note_id: note.id,
                offset: Point::new(at.x - note.position_x, at.y - note.position_y),
                position: Point::new(note.position_x, note.position_y),
            },
        );
        true
    }

    /// Updates the in-memory position of the note under `pointer`.
    ///
    /// Returns `None` when the pointer is idle.
    pub fn pointer_move(&mut self, pointer: PointerId, at: Point) -> Option<(NoteId, Point)> {
        let session = self.sessions.get_mut(&pointer)?;
        session.position = clamp_position(Point::new(
            at.x - session.offset.x,
            at.y - session.offset.y,
        ));
        Some((session.note_id, session.position))
    }

    /// Dragging -> Idle, yielding the latest in-memory position.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<DragCommit> {
        self.sessions.remove(&pointer).map(|session| DragCommit {
            note_id: session.note_id,
            position: session.position,
        })
    }

    pub fn state(&self, pointer: PointerId) -> DragState {
        match self.sessions.get(&pointer) {
            Some(session) => DragState::Dragging {
                note_id: session.note_id,
                position: session.position,
            },
            None => DragState::Idle,
        }
    }

    pub fn is_dragging(&self, note_id: NoteId) -> bool {
        self.sessions
            .values()
            .any(|session| session.note_id == note_id)
    }

    /// Number of pointers currently dragging.
    pub fn active_drags(&self) -> usize {
        self.sessions.len()
    }
}

pub fn clamp_position(position: Point) -> Point {
    Point::new(position.x.max(MIN_X), position.y.max(MIN_Y))
}

#[cfg(test)]
mod tests {
    use super::{DragPositioner, DragState, Point, PressTarget};
    use crate::model::note::Note;
    use uuid::Uuid;

    fn note_at(x: f64, y: f64) -> Note {
        let mut note = Note::new(Uuid::new_v4(), "tester@example.com");
        note.position_x = x;
        note.position_y = y;
        note
    }

    #[test]
    fn move_keeps_grab_offset() {
        let note = note_at(100.0, 200.0);
        let mut drag = DragPositioner::new();
        assert!(drag.pointer_down(1, &note, Point::new(110.0, 215.0), PressTarget::Card));

        let (_, position) = drag.pointer_move(1, Point::new(160.0, 255.0)).unwrap();
        assert_eq!(position, Point::new(150.0, 240.0));

        let commit = drag.pointer_up(1).unwrap();
        assert_eq!(commit.note_id, note.id);
        assert_eq!(commit.position, Point::new(150.0, 240.0));
        assert_eq!(drag.state(1), DragState::Idle);
    }

    #[test]
    fn move_clamps_to_canvas_minimums() {
        let note = note_at(10.0, 100.0);
        let mut drag = DragPositioner::new();
        drag.pointer_down(1, &note, Point::new(10.0, 100.0), PressTarget::Card);

        let (_, position) = drag.pointer_move(1, Point::new(-50.0, 20.0)).unwrap();
        assert_eq!(position, Point::new(0.0, 80.0));
    }

    #[test]
    fn interactive_press_stays_idle() {
        let note = note_at(0.0, 80.0);
        let mut drag = DragPositioner::new();
        assert!(!drag.pointer_down(1, &note, Point::new(5.0, 90.0), PressTarget::Interactive));
        assert_eq!(drag.pointer_move(1, Point::new(50.0, 150.0)), None);
        assert_eq!(drag.pointer_up(1), None);
    }

    #[test]
    fn separate_pointers_drag_independently() {
        let first = note_at(0.0, 100.0);
        let second = note_at(300.0, 100.0);
        let mut drag = DragPositioner::new();
        assert!(drag.pointer_down(1, &first, Point::new(0.0, 100.0), PressTarget::Card));
        assert!(drag.pointer_down(2, &second, Point::new(300.0, 100.0), PressTarget::Card));
        assert!(!drag.pointer_down(3, &first, Point::new(0.0, 100.0), PressTarget::Card));

        drag.pointer_move(2, Point::new(320.0, 130.0));
        let first_commit = drag.pointer_up(1).unwrap();
        assert_eq!(first_commit.position, Point::new(0.0, 100.0));
        assert_eq!(drag.active_drags(), 1);
        assert_eq!(
            drag.pointer_up(2).unwrap().position,
            Point::new(320.0, 130.0)
        );
    }
}
