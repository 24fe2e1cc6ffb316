//! Board record: a named collection of notes owned by one user.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BoardId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub owner_email: String,
    /// Stamped by the repository on create.
    pub created_date: i64,
    /// Stamped by the repository on every write.
    pub updated_date: i64,
}

impl Board {
    /// Creates an unsaved board; the name is trimmed.
    pub fn new(name: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            owner_email: owner_email.into(),
            created_date: 0,
            updated_date: 0,
        }
    }

    pub fn validate(&self) -> Result<(), BoardValidationError> {
        if self.id.is_nil() {
            return Err(BoardValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(BoardValidationError::BlankName);
        }
        if self.owner_email.trim().is_empty() {
            return Err(BoardValidationError::BlankOwner);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    NilId,
    BlankName,
    BlankOwner,
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "board id must not be nil"),
            Self::BlankName => write!(f, "board name must not be blank"),
            Self::BlankOwner => write!(f, "board owner must not be blank"),
        }
    }
}

impl Error for BoardValidationError {}
