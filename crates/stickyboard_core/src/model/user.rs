//! Signed-in user record.
//!
//! # Invariants
//! - `email` contains `@` and is unique (case-insensitive) in the store.
//! - Only `SubscriptionStatus::Pro` unlocks protected pages.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Paywall state mirrored from the billing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Free,
    Pro,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Self::Free),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub subscription_status: SubscriptionStatus,
    pub has_seen_onboarding: bool,
}

impl User {
    /// Creates a free-tier user who has not seen onboarding yet.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into().trim().to_string(),
            full_name: None,
            role: UserRole::User,
            subscription_status: SubscriptionStatus::Free,
            has_seen_onboarding: false,
        }
    }

    pub fn is_pro(&self) -> bool {
        self.subscription_status == SubscriptionStatus::Pro
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.id.is_nil() {
            return Err(UserValidationError::NilId);
        }
        let email = self.email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Fields a user may change about themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub full_name: Option<Option<String>>,
    pub has_seen_onboarding: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    NilId,
    InvalidEmail(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "user id must not be nil"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
        }
    }
}

impl Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::{SubscriptionStatus, User, UserValidationError};

    #[test]
    fn new_user_starts_on_free_tier() {
        let user = User::new(" tester@example.com ");
        assert_eq!(user.email, "tester@example.com");
        assert_eq!(user.subscription_status, SubscriptionStatus::Free);
        assert!(!user.is_pro());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn validate_rejects_email_without_domain() {
        let user = User::new("tester@");
        assert_eq!(
            user.validate().unwrap_err(),
            UserValidationError::InvalidEmail("tester@".to_string())
        );
    }
}
