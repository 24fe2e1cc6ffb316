//! Client-side preference storage.
//!
//! # Responsibility
//! - Provide one get/set/remove/clear surface over string keys.
//! - Offer typed accessors for the handful of keys the app persists: last
//!   opened board, assistant toolbar placement, per-user audience mode.
//!
//! # Invariants
//! - Values are plain strings or JSON; there is no versioning.
//! - Unreadable values degrade to "unset" with a warning, never an error.

use super::RepoResult;
use crate::audience::AudienceMode;
use crate::model::board::BoardId;
use crate::model::now_epoch_ms;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const LAST_BOARD_KEY: &str = "last_board_id";
const AUDIENCE_KEY_PREFIX: &str = "stickyboard-user-type-";
const TOOLBAR_POSITION_KEY_PREFIX: &str = "toolbar-position-";
const TOOLBAR_EXPANDED_KEY_PREFIX: &str = "toolbar-expanded-";

/// Key/value store replacing browser local storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;
    fn clear(&self) -> RepoResult<()>;
}

/// Preferences persisted in the entity store's `preferences` table.
pub struct SqlitePreferenceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceStore for SqlitePreferenceStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, now_epoch_ms()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM preferences;", [])?;
        Ok(())
    }
}

/// Process-local store for scratch sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.values.borrow_mut().clear();
        Ok(())
    }
}

/// Placement of the floating board toolbar / assistant panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub x: f64,
    pub y: f64,
    pub expanded: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            expanded: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPosition {
    #[serde(rename = "savedX")]
    saved_x: f64,
    #[serde(rename = "savedY")]
    saved_y: f64,
}

/// Typed view over a `PreferenceStore`.
pub struct Preferences<S: PreferenceStore> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn last_board_id(&self) -> RepoResult<Option<BoardId>> {
        let Some(raw) = self.store.get(LAST_BOARD_KEY)? else {
            return Ok(None);
        };
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!(
                    "event=prefs_read module=prefs status=error key={LAST_BOARD_KEY} error_code=invalid_value"
                );
                Ok(None)
            }
        }
    }

    pub fn set_last_board_id(&self, board_id: BoardId) -> RepoResult<()> {
        self.store.set(LAST_BOARD_KEY, &board_id.to_string())
    }

    pub fn forget_last_board_id(&self) -> RepoResult<()> {
        self.store.remove(LAST_BOARD_KEY)
    }

    /// Audience mode saved for `email`, if any.
    pub fn audience_mode(&self, email: &str) -> RepoResult<Option<AudienceMode>> {
        let key = audience_key(email);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };
        let mode = AudienceMode::parse(raw.trim());
        if mode.is_none() {
            warn!(
                "event=prefs_read module=prefs status=error key=audience error_code=invalid_value"
            );
        }
        Ok(mode)
    }

    pub fn set_audience_mode(&self, email: &str, mode: AudienceMode) -> RepoResult<()> {
        self.store.set(&audience_key(email), mode.as_str())
    }

    pub fn panel_state(&self, email: &str) -> RepoResult<PanelState> {
        let mut state = PanelState::default();

        if let Some(raw) = self
            .store
            .get(&format!("{TOOLBAR_POSITION_KEY_PREFIX}{email}"))?
        {
            match serde_json::from_str::<StoredPosition>(&raw) {
                Ok(position) => {
                    state.x = position.saved_x;
                    state.y = position.saved_y;
                }
                Err(_) => warn!(
                    "event=prefs_read module=prefs status=error key=toolbar_position error_code=invalid_json"
                ),
            }
        }

        if let Some(raw) = self
            .store
            .get(&format!("{TOOLBAR_EXPANDED_KEY_PREFIX}{email}"))?
        {
            match serde_json::from_str::<bool>(&raw) {
                Ok(expanded) => state.expanded = expanded,
                Err(_) => warn!(
                    "event=prefs_read module=prefs status=error key=toolbar_expanded error_code=invalid_json"
                ),
            }
        }

        Ok(state)
    }

    pub fn set_panel_position(&self, email: &str, x: f64, y: f64) -> RepoResult<()> {
        let encoded = serde_json::json!({ "savedX": x, "savedY": y }).to_string();
        self.store
            .set(&format!("{TOOLBAR_POSITION_KEY_PREFIX}{email}"), &encoded)
    }

    pub fn set_panel_expanded(&self, email: &str, expanded: bool) -> RepoResult<()> {
        self.store.set(
            &format!("{TOOLBAR_EXPANDED_KEY_PREFIX}{email}"),
            if expanded { "true" } else { "false" },
        )
    }

    pub fn clear(&self) -> RepoResult<()> {
        self.store.clear()
    }
}

fn audience_key(email: &str) -> String {
    format!("{AUDIENCE_KEY_PREFIX}{email}")
}
