//! Core domain logic for StickyBoard.
//! This crate is the single source of truth for board, note and paywall
//! invariants; UI shells only call into it.

pub mod ai;
pub mod audience;
pub mod config;
pub mod db;
pub mod drag;
pub mod integration;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use audience::{AudienceMode, AudienceProfile};
pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    active_logging, default_log_level, init_logging, start_logging, ActiveLogging, LoggingError,
};
pub use model::board::{Board, BoardId};
pub use model::note::{Note, NoteDraft, NoteId, NotePatch};
pub use model::user::{SubscriptionStatus, User};
pub use repo::{RepoError, RepoResult, SortSpec};
pub use service::{AppState, BoardSession, Page, SessionError};
pub use view::{layout, ViewContext, ViewLayout, ViewMode};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
