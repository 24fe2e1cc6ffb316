//! Board repository contract and SQLite implementation.
//!
//! # Invariants
//! - `create_board` and `update_board` stamp timestamps; callers never do.
//! - `delete_board` fails while notes still reference the board; cascading
//!   is the caller's job (notes first, then the board).

use super::{order_clause, parse_uuid, EntityKind, RepoError, RepoResult, SortSpec};
use crate::model::board::{Board, BoardId, BoardPatch};
use crate::model::now_epoch_ms;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const BOARD_SELECT_SQL: &str = "SELECT
    id,
    name,
    owner_email,
    created_date,
    updated_date
FROM boards";

/// Exact-match predicate for board listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    pub owner_email: Option<String>,
}

impl BoardFilter {
    pub fn owned_by(email: impl Into<String>) -> Self {
        Self {
            owner_email: Some(email.into()),
        }
    }
}

pub trait BoardRepository {
    fn list_boards(&self) -> RepoResult<Vec<Board>>;
    fn filter_boards(&self, filter: &BoardFilter, sort: Option<&SortSpec>)
        -> RepoResult<Vec<Board>>;
    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>>;
    fn create_board(&self, board: &Board) -> RepoResult<Board>;
    fn update_board(&self, id: BoardId, patch: &BoardPatch) -> RepoResult<Board>;
    fn delete_board(&self, id: BoardId) -> RepoResult<()>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn list_boards(&self) -> RepoResult<Vec<Board>> {
        self.filter_boards(&BoardFilter::default(), None)
    }

    fn filter_boards(
        &self,
        filter: &BoardFilter,
        sort: Option<&SortSpec>,
    ) -> RepoResult<Vec<Board>> {
        let mut sql = format!("{BOARD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = filter.owner_email.as_ref() {
            sql.push_str(" AND owner_email = ? COLLATE NOCASE");
            bind_values.push(Value::Text(owner.clone()));
        }
        sql.push_str(&order_clause(sort, "name"));
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_board_row(row)?);
        }
        Ok(boards)
    }

    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOARD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_board_row(row)?)),
            None => Ok(None),
        }
    }

    fn create_board(&self, board: &Board) -> RepoResult<Board> {
        let mut stored = board.clone();
        stored.name = stored.name.trim().to_string();
        stored.validate()?;

        let now = now_epoch_ms();
        stored.created_date = now;
        stored.updated_date = now;

        self.conn.execute(
            "INSERT INTO boards (id, name, owner_email, created_date, updated_date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                stored.id.to_string(),
                stored.name.as_str(),
                stored.owner_email.as_str(),
                stored.created_date,
                stored.updated_date,
            ],
        )?;
        Ok(stored)
    }

    fn update_board(&self, id: BoardId, patch: &BoardPatch) -> RepoResult<Board> {
        let mut board = self.get_board(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Board,
            id,
        })?;
        if let Some(name) = patch.name.as_ref() {
            board.name = name.trim().to_string();
        }
        board.validate()?;
        board.updated_date = now_epoch_ms();

        self.conn.execute(
            "UPDATE boards SET name = ?2, updated_date = ?3 WHERE id = ?1;",
            params![id.to_string(), board.name.as_str(), board.updated_date],
        )?;
        Ok(board)
    }

    fn delete_board(&self, id: BoardId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM boards WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Board,
                id,
            });
        }
        Ok(())
    }
}

fn parse_board_row(row: &Row<'_>) -> RepoResult<Board> {
    let id_text: String = row.get("id")?;
    Ok(Board {
        id: parse_uuid(&id_text, "boards.id")?,
        name: row.get("name")?,
        owner_email: row.get("owner_email")?,
        created_date: row.get("created_date")?,
        updated_date: row.get("updated_date")?,
    })
}
