//! Domain model for users, boards and sticky notes.
//!
//! # Responsibility
//! - Define the records owned by the entity store.
//! - Keep lifecycle helpers (archive/restore, patch application) next to data.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Archiving is a flag on the note, not a delete.
//! - Timestamps are Unix epoch milliseconds.

pub mod board;
pub mod note;
pub mod user;

use chrono::Utc;

/// Current wall clock in epoch milliseconds, used for `*_date` stamps.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
