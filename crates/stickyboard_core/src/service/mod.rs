//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into page-level use-cases (boards overview,
//!   board page, archive, profile, pricing).
//! - Keep UI/FFI layers decoupled from storage details.

pub mod app_state;
pub mod archive_service;
pub mod billing_service;
pub mod board_service;
pub mod board_session;
pub mod note_service;
pub mod progress;

pub use app_state::{guard_route, AppState, Page, SessionError};
pub use archive_service::{search_archive, ArchiveService, ArchivedNote};
pub use billing_service::{subscribe, BillingError};
pub use board_service::{BoardService, BoardServiceError, BoardStats, BoardSummary};
pub use board_session::BoardSession;
pub use note_service::{BulkApplyOutcome, NoteService, NoteServiceError};
pub use progress::{progress, Achievement, Progress, UserStats};
