//! Session-scoped user access.
//!
//! # Responsibility
//! - Resolve the signed-in user (`me`) and apply self-service updates.
//! - Stand in for the hosted login/logout redirects with a local session row.
//!
//! # Invariants
//! - At most one session row exists; `login` replaces it.
//! - Every user-scoped call fails with `NotAuthenticated` when signed out.

use super::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use crate::model::user::{SubscriptionStatus, User, UserPatch, UserRole};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    u.id AS id,
    u.email AS email,
    u.full_name AS full_name,
    u.role AS role,
    u.subscription_status AS subscription_status,
    u.has_seen_onboarding AS has_seen_onboarding
FROM users u";

pub trait UserRepository {
    /// Returns the signed-in user or `NotAuthenticated`.
    fn me(&self) -> RepoResult<User>;
    fn update_my_user_data(&self, patch: &UserPatch) -> RepoResult<User>;
    /// Signs in `email`, creating a free-tier account on first login.
    fn login(&self, email: &str, full_name: Option<&str>) -> RepoResult<User>;
    fn logout(&self) -> RepoResult<()>;
    /// Mirrors the billing provider's verdict onto the signed-in user.
    fn set_subscription_status(&self, status: SubscriptionStatus) -> RepoResult<User>;
}

/// SQLite-backed user/session repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} WHERE u.email = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn write_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;
        self.conn.execute(
            "UPDATE users
             SET
                full_name = ?2,
                subscription_status = ?3,
                has_seen_onboarding = ?4
             WHERE id = ?1;",
            params![
                user.id.to_string(),
                user.full_name.as_deref(),
                user.subscription_status.as_str(),
                bool_to_int(user.has_seen_onboarding),
            ],
        )?;
        Ok(())
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn me(&self) -> RepoResult<User> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             INNER JOIN session s ON s.user_id = u.id
             WHERE s.slot = 1;"
        ))?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => parse_user_row(row),
            None => Err(RepoError::NotAuthenticated),
        }
    }

    fn update_my_user_data(&self, patch: &UserPatch) -> RepoResult<User> {
        let mut user = self.me()?;
        if let Some(full_name) = patch.full_name.as_ref() {
            user.full_name = full_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
        }
        if let Some(seen) = patch.has_seen_onboarding {
            user.has_seen_onboarding = seen;
        }
        self.write_user(&user)?;
        Ok(user)
    }

    fn login(&self, email: &str, full_name: Option<&str>) -> RepoResult<User> {
        let user = match self.find_by_email(email.trim())? {
            Some(existing) => existing,
            None => {
                let mut user = User::new(email);
                user.full_name = full_name
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string);
                user.validate()?;
                self.conn.execute(
                    "INSERT INTO users (
                        id,
                        email,
                        full_name,
                        role,
                        subscription_status,
                        has_seen_onboarding
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                    params![
                        user.id.to_string(),
                        user.email.as_str(),
                        user.full_name.as_deref(),
                        user.role.as_str(),
                        user.subscription_status.as_str(),
                        bool_to_int(user.has_seen_onboarding),
                    ],
                )?;
                user
            }
        };

        self.conn.execute(
            "INSERT INTO session (slot, user_id) VALUES (1, ?1)
             ON CONFLICT(slot) DO UPDATE SET user_id = excluded.user_id;",
            [user.id.to_string()],
        )?;
        Ok(user)
    }

    fn logout(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM session WHERE slot = 1;", [])?;
        Ok(())
    }

    fn set_subscription_status(&self, status: SubscriptionStatus) -> RepoResult<User> {
        let mut user = self.me()?;
        user.subscription_status = status;
        self.write_user(&user)?;
        Ok(user)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let role: String = row.get("role")?;
    let status: String = row.get("subscription_status")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        email: row.get("email")?,
        full_name: row.get("full_name")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| RepoError::InvalidData(format!("invalid role `{role}` in users.role")))?,
        subscription_status: SubscriptionStatus::parse(&status).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid subscription status `{status}` in users.subscription_status"
            ))
        })?,
        has_seen_onboarding: int_to_bool(
            row.get("has_seen_onboarding")?,
            "users.has_seen_onboarding",
        )?,
    })
}
