//! Entity client: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Offer list/filter/get/create/update/delete for boards and notes, and
//!   session-scoped user access, over the local entity store.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the record before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Unknown ids surface as `RepoError::NotFound`, never as silent no-ops.
//! - Without a sort spec, listings come back in insertion order.

pub mod board_repo;
pub mod note_repo;
pub mod preference_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::board::BoardValidationError;
use crate::model::note::NoteValidationError;
use crate::model::user::UserValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use board_repo::{BoardFilter, BoardRepository, SqliteBoardRepository};
pub use note_repo::{NoteFilter, NoteRepository, SqliteNoteRepository};
pub use preference_repo::{
    MemoryPreferenceStore, PanelState, PreferenceStore, Preferences, SqlitePreferenceStore,
};
pub use user_repo::{SqliteUserRepository, UserRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity kinds reported by `RepoError::NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Board,
    Note,
    User,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Note => "note",
            Self::User => "user",
        }
    }
}

/// Error shared by every entity repository.
#[derive(Debug)]
pub enum RepoError {
    BoardValidation(BoardValidationError),
    NoteValidation(NoteValidationError),
    UserValidation(UserValidationError),
    Db(DbError),
    NotFound { kind: EntityKind, id: Uuid },
    InvalidData(String),
    InvalidSort(String),
    NotAuthenticated,
}

impl RepoError {
    /// Stable code used in log lines and bridge envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BoardValidation(_) | Self::NoteValidation(_) | Self::UserValidation(_) => {
                "validation_failed"
            }
            Self::Db(_) => "db_error",
            Self::NotFound { .. } => "not_found",
            Self::InvalidData(_) => "invalid_data",
            Self::InvalidSort(_) => "invalid_sort",
            Self::NotAuthenticated => "not_authenticated",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardValidation(err) => write!(f, "{err}"),
            Self::NoteValidation(err) => write!(f, "{err}"),
            Self::UserValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::InvalidSort(spec) => write!(f, "unsupported sort spec `{spec}`"),
            Self::NotAuthenticated => write!(f, "no user is signed in"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BoardValidation(err) => Some(err),
            Self::NoteValidation(err) => Some(err),
            Self::UserValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::InvalidData(_)
            | Self::InvalidSort(_)
            | Self::NotAuthenticated => None,
        }
    }
}

impl From<BoardValidationError> for RepoError {
    fn from(value: BoardValidationError) -> Self {
        Self::BoardValidation(value)
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::NoteValidation(value)
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::UserValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sortable fields shared by board and note listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    UpdatedDate,
    CreatedDate,
    /// `title` for notes, `name` for boards.
    Label,
}

/// Sort order in the entity-client string form: `"-updated_date"` sorts
/// descending, `"updated_date"` ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl SortSpec {
    pub const NEWEST_FIRST: SortSpec = SortSpec {
        field: SortField::UpdatedDate,
        descending: true,
    };

    pub fn parse(value: &str) -> RepoResult<Self> {
        let trimmed = value.trim();
        let (descending, key) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let field = match key {
            "updated_date" => SortField::UpdatedDate,
            "created_date" => SortField::CreatedDate,
            "title" | "name" => SortField::Label,
            _ => return Err(RepoError::InvalidSort(value.to_string())),
        };
        Ok(Self { field, descending })
    }

    /// Renders an `ORDER BY` clause; ties fall back to insertion order in the
    /// same direction.
    fn order_by_sql(&self, label_column: &str) -> String {
        let column = match self.field {
            SortField::UpdatedDate => "updated_date",
            SortField::CreatedDate => "created_date",
            SortField::Label => label_column,
        };
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!(" ORDER BY {column} {direction}, rowid {direction}")
    }
}

fn order_clause(sort: Option<&SortSpec>, label_column: &str) -> String {
    match sort {
        Some(spec) => spec.order_by_sql(label_column),
        None => " ORDER BY rowid ASC".to_string(),
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{RepoError, SortField, SortSpec};

    #[test]
    fn sort_spec_parses_leading_dash_as_descending() {
        let spec = SortSpec::parse("-updated_date").unwrap();
        assert_eq!(spec, SortSpec::NEWEST_FIRST);

        let spec = SortSpec::parse("name").unwrap();
        assert_eq!(spec.field, SortField::Label);
        assert!(!spec.descending);
    }

    #[test]
    fn sort_spec_rejects_unknown_field() {
        let err = SortSpec::parse("-color").unwrap_err();
        assert!(matches!(err, RepoError::InvalidSort(spec) if spec == "-color"));
    }

    #[test]
    fn order_clause_breaks_ties_by_rowid() {
        let spec = SortSpec::parse("-created_date").unwrap();
        assert_eq!(
            spec.order_by_sql("title"),
            " ORDER BY created_date DESC, rowid DESC"
        );
    }
}
