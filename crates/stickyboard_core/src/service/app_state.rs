//! Session-wide application state and route guard.
//!
//! # Responsibility
//! - Resolve the signed-in user once at session start and cache it.
//! - Resolve the active audience mode from per-user preferences.
//! - Decide which page a user may see (paywall and sign-in redirects).
//! - Profile self-service: full name, audience mode, onboarding flag.
//!
//! # Invariants
//! - `Landing` and `Pricing` are public; every other page needs a signed-in
//!   `pro` user.
//! - The cached user is replaced after every successful write, so callers
//!   never observe a stale subscription status.

use crate::audience::AudienceMode;
use crate::model::user::{SubscriptionStatus, User, UserPatch};
use crate::repo::{PreferenceStore, Preferences, RepoError, UserRepository};
use crate::service::note_service::NoteServiceError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Landing,
    Pricing,
    Boards,
    Board,
    Archive,
    Profile,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Pricing => "pricing",
            Self::Boards => "boards",
            Self::Board => "board",
            Self::Archive => "archive",
            Self::Profile => "profile",
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Landing | Self::Pricing)
    }
}

/// Error returned by page-level session operations.
#[derive(Debug)]
pub enum SessionError {
    /// The caller must navigate to the given page instead.
    Redirect(Page),
    Repo(RepoError),
    Note(NoteServiceError),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Redirect(_) => "redirect",
            Self::Repo(err) => err.code(),
            Self::Note(err) => err.code(),
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redirect(page) => write!(f, "redirect to {}", page.as_str()),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Note(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Redirect(_) => None,
            Self::Repo(err) => Some(err),
            Self::Note(err) => Some(err),
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotAuthenticated => Self::Redirect(Page::Landing),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteServiceError> for SessionError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::Repo(err) => err.into(),
            other => Self::Note(other),
        }
    }
}

/// Decides whether `user` may view `page`.
pub fn guard_route(user: Option<&User>, page: Page) -> Result<(), SessionError> {
    match (user, page) {
        (Some(user), Page::Pricing) if user.is_pro() => Err(SessionError::Redirect(Page::Boards)),
        (_, page) if page.is_public() => Ok(()),
        (None, _) => Err(SessionError::Redirect(Page::Landing)),
        (Some(user), _) if !user.is_pro() => Err(SessionError::Redirect(Page::Pricing)),
        (Some(_), _) => Ok(()),
    }
}

/// Explicit application-state container for one UI session.
pub struct AppState<U: UserRepository, S: PreferenceStore> {
    users: U,
    prefs: Preferences<S>,
    current: Option<User>,
    audience: AudienceMode,
    default_audience: AudienceMode,
}

impl<U: UserRepository, S: PreferenceStore> AppState<U, S> {
    /// Loads the signed-in user (if any) and their audience preference.
    pub fn bootstrap(
        users: U,
        store: S,
        default_audience: AudienceMode,
    ) -> Result<Self, RepoError> {
        let mut state = Self {
            users,
            prefs: Preferences::new(store),
            current: None,
            audience: default_audience,
            default_audience,
        };
        state.refresh()?;
        Ok(state)
    }

    /// Re-reads the signed-in user from the entity client.
    pub fn refresh(&mut self) -> Result<Option<&User>, RepoError> {
        self.current = match self.users.me() {
            Ok(user) => Some(user),
            Err(RepoError::NotAuthenticated) => None,
            Err(err) => return Err(err),
        };
        self.audience = match &self.current {
            Some(user) => self
                .prefs
                .audience_mode(&user.email)?
                .unwrap_or(self.default_audience),
            None => self.default_audience,
        };
        Ok(self.current.as_ref())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Signed-in user, or a redirect to the landing page.
    pub fn require_user(&self) -> Result<&User, SessionError> {
        self.current
            .as_ref()
            .ok_or(SessionError::Redirect(Page::Landing))
    }

    pub fn audience(&self) -> AudienceMode {
        self.audience
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.prefs
    }

    pub fn guard(&self, page: Page) -> Result<(), SessionError> {
        let result = guard_route(self.current.as_ref(), page);
        if let Err(SessionError::Redirect(target)) = &result {
            info!(
                "event=route_guard module=service status=redirect page={} target={}",
                page.as_str(),
                target.as_str()
            );
        }
        result
    }

    pub fn login(&mut self, email: &str, full_name: Option<&str>) -> Result<&User, RepoError> {
        self.users.login(email, full_name)?;
        self.refresh()?;
        self.current.as_ref().ok_or(RepoError::NotAuthenticated)
    }

    pub fn logout(&mut self) -> Result<(), RepoError> {
        self.users.logout()?;
        self.current = None;
        self.audience = self.default_audience;
        Ok(())
    }

    /// Records the billing provider's verdict for the signed-in user.
    pub fn set_subscription(&mut self, status: SubscriptionStatus) -> Result<&User, RepoError> {
        let user = self.users.set_subscription_status(status)?;
        info!(
            "event=subscription_update module=service status=ok subscription={}",
            status.as_str()
        );
        Ok(self.current.insert(user))
    }

    /// Saves the profile name; a blank name clears it.
    pub fn update_full_name(&mut self, full_name: &str) -> Result<&User, SessionError> {
        self.require_user()?;
        let trimmed = full_name.trim();
        let patch = UserPatch {
            full_name: Some((!trimmed.is_empty()).then(|| trimmed.to_string())),
            ..UserPatch::default()
        };
        let user = self.users.update_my_user_data(&patch)?;
        Ok(self.current.insert(user))
    }

    pub fn set_audience_mode(&mut self, mode: AudienceMode) -> Result<(), SessionError> {
        let email = self.require_user()?.email.clone();
        self.prefs.set_audience_mode(&email, mode)?;
        self.audience = mode;
        info!(
            "event=audience_switch module=service status=ok audience={}",
            mode.as_str()
        );
        Ok(())
    }

    /// Marks onboarding as seen; returns `false` when it already was.
    pub fn complete_onboarding(&mut self) -> Result<bool, SessionError> {
        if self.require_user()?.has_seen_onboarding {
            return Ok(false);
        }
        let patch = UserPatch {
            has_seen_onboarding: Some(true),
            ..UserPatch::default()
        };
        match self.users.update_my_user_data(&patch) {
            Ok(user) => {
                self.current = Some(user);
                Ok(true)
            }
            Err(err) => {
                warn!(
                    "event=onboarding_complete module=service status=error error_code={}",
                    err.code()
                );
                Err(err.into())
            }
        }
    }
}
