//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board/note use-cases to the UI shell via FRB.
//! - Flatten core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection to the configured store.
//! - Layouts and suggestions cross the boundary as JSON strings.

use chrono::NaiveDate;
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use stickyboard_core::ai::AiAssistant;
use stickyboard_core::drag::Point;
use stickyboard_core::integration::{Integrations, LocalLlm};
use stickyboard_core::repo::{
    NoteFilter, NoteRepository, SqliteBoardRepository, SqliteNoteRepository,
    SqlitePreferenceStore, SqliteUserRepository,
};
use stickyboard_core::service::{
    progress, search_archive, subscribe, ArchiveService, BillingError, BoardService,
    NoteService,
};
use stickyboard_core::view::{DecisionQuadrant, EisenhowerQuadrant, QuickFilter};
use stickyboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, AppState, AudienceMode, BoardId, BoardSession, NoteId, Page,
    SessionError, User, ViewMode,
};
use uuid::Uuid;

const STORE_FILE_NAME: &str = "stickyboard.sqlite3";
static STORE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the entity store file for the rest of the process.
///
/// Returns empty string on success; a second call with a different path is
/// rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store_path(path: String) -> String {
    let trimmed = PathBuf::from(path.trim());
    if trimmed.as_os_str().is_empty() {
        return "store path cannot be empty".to_string();
    }
    let active = STORE_PATH.get_or_init(|| trimmed.clone());
    if *active == trimmed {
        String::new()
    } else {
        format!(
            "store already configured at `{}`; refusing to switch",
            active.display()
        )
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Affected entity ID, when there is one.
    pub id: Option<String>,
    /// Page the UI must navigate to instead, when guarded.
    pub redirect: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            redirect: None,
            message: message.into(),
        }
    }

    fn failure(err: FfiError) -> Self {
        Self {
            ok: false,
            id: None,
            redirect: err.redirect,
            message: err.message,
        }
    }
}

/// One card of the boards overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    pub id: String,
    pub name: String,
    pub total: u32,
    pub completed: u32,
    pub urgent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardListResponse {
    pub items: Vec<BoardItem>,
    pub redirect: Option<String>,
    pub message: String,
}

/// Rendered board page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardViewResponse {
    pub ok: bool,
    pub board_name: String,
    /// `ViewLayout` serialized as JSON.
    pub layout_json: String,
    pub redirect: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantResponse {
    pub ok: bool,
    pub text: String,
    /// Suggestions serialized as JSON (`[]` when none).
    pub suggestions_json: String,
    pub message: String,
}

/// Signs in `email`, creating the account on first login.
#[flutter_rust_bridge::frb(sync)]
pub fn login(email: String, full_name: Option<String>) -> ActionResponse {
    let result = with_app_state(|state| {
        let user = state
            .login(email.trim(), full_name.as_deref())
            .map_err(|err| FfiError::message(err.to_string()))?;
        Ok(user.id.to_string())
    });
    match result {
        Ok(id) => ActionResponse::success("Signed in.", Some(id)),
        Err(err) => ActionResponse::failure(err),
    }
}

/// Boards overview for the signed-in pro user.
#[flutter_rust_bridge::frb(sync)]
pub fn list_boards() -> BoardListResponse {
    let result = with_page(Page::Boards, |conn, user, _audience| {
        let service = BoardService::new(
            SqliteBoardRepository::new(conn),
            SqliteNoteRepository::new(conn),
        );
        service
            .overview(&user.email)
            .map_err(|err| FfiError::message(err.to_string()))
    });
    match result {
        Ok(summaries) => {
            let items = summaries
                .into_iter()
                .map(|summary| BoardItem {
                    id: summary.board.id.to_string(),
                    name: summary.board.name,
                    total: to_u32(summary.stats.total),
                    completed: to_u32(summary.stats.completed),
                    urgent: to_u32(summary.stats.urgent),
                })
                .collect::<Vec<_>>();
            BoardListResponse {
                message: format!("{} board(s).", items.len()),
                items,
                redirect: None,
            }
        }
        Err(err) => BoardListResponse {
            items: Vec::new(),
            redirect: err.redirect,
            message: err.message,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn create_board(name: String) -> ActionResponse {
    let result = with_page(Page::Boards, |conn, user, _audience| {
        let service = BoardService::new(
            SqliteBoardRepository::new(conn),
            SqliteNoteRepository::new(conn),
        );
        service
            .create_board(&name, &user.email)
            .map_err(|err| FfiError::message(err.to_string()))
    });
    match result {
        Ok(board) => ActionResponse::success("Board created.", Some(board.id.to_string())),
        Err(err) => ActionResponse::failure(err),
    }
}

/// Renders one board in `view_mode` after search and quick filter.
///
/// `today` is `YYYY-MM-DD` in the user's local calendar.
#[flutter_rust_bridge::frb(sync)]
pub fn board_view(
    board_id: String,
    view_mode: String,
    search: String,
    quick_filter: Option<String>,
    today: String,
) -> BoardViewResponse {
    let failure = |err: FfiError| BoardViewResponse {
        ok: false,
        board_name: String::new(),
        layout_json: String::new(),
        redirect: err.redirect,
        message: err.message,
    };

    let Some(mode) = ViewMode::parse(view_mode.trim()) else {
        return failure(FfiError::message(format!("unknown view mode `{view_mode}`")));
    };
    let quick = match quick_filter.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match QuickFilter::parse(raw) {
            Some(filter) => Some(filter),
            None => return failure(FfiError::message(format!("unknown quick filter `{raw}`"))),
        },
    };
    let Ok(today) = today.trim().parse::<NaiveDate>() else {
        return failure(FfiError::message(format!("invalid date `{today}`")));
    };

    let result = with_board_session(&board_id, |session| {
        session.set_view_mode(mode);
        session.set_search(&search);
        session.set_quick_filter(quick);
        let layout_json = session
            .render(today, |layout| serde_json::to_string(layout))
            .map_err(|err| FfiError::message(format!("layout encode failed: {err}")))?;
        Ok((session.board().name.clone(), layout_json))
    });
    match result {
        Ok((board_name, layout_json)) => BoardViewResponse {
            ok: true,
            board_name,
            layout_json,
            redirect: None,
            message: String::new(),
        },
        Err(err) => failure(err),
    }
}

/// Persists a freeform canvas position (clamped to the canvas).
#[flutter_rust_bridge::frb(sync)]
pub fn move_note(note_id: String, x: f64, y: f64) -> ActionResponse {
    let result = parse_id(&note_id, "note_id").and_then(|id: NoteId| {
        with_page(Page::Board, |conn, user, _audience| {
            let service = NoteService::new(SqliteNoteRepository::new(conn));
            service
                .owned_note(id, &user.email)
                .and_then(|_| service.move_note(id, Point::new(x, y)))
                .map_err(|err| FfiError::message(err.to_string()))
        })
    });
    match result {
        Ok(note) => ActionResponse::success("Note moved.", Some(note.id.to_string())),
        Err(err) => ActionResponse::failure(err),
    }
}

/// Drops a note on a matrix quadrant and saves the quadrant's fields.
///
/// `matrix` is `eisenhower` or `decision`; `quadrant` is the quadrant key
/// (`do`, `quick_wins`, ...).
#[flutter_rust_bridge::frb(sync)]
pub fn drop_note(
    board_id: String,
    note_id: String,
    matrix: String,
    quadrant: String,
) -> ActionResponse {
    let result = parse_id(&note_id, "note_id").and_then(|id: NoteId| {
        let target = parse_drop_target(&matrix, &quadrant)?;
        with_board_session(&board_id, |session| {
            let dropped = match target {
                DropTarget::Eisenhower(quadrant) => session.drop_on_eisenhower(id, quadrant),
                DropTarget::Decision(quadrant) => session.drop_on_decision(id, quadrant),
            };
            dropped.map_err(|err| FfiError::message(err.to_string()))
        })
    });
    match result {
        Ok(note) => ActionResponse::success("Note dropped.", Some(note.id.to_string())),
        Err(err) => ActionResponse::failure(err),
    }
}

/// Sends one assistant request with every active note as context.
///
/// Runs against the local LLM stand-in.
#[flutter_rust_bridge::frb(sync)]
pub fn assistant_request(board_id: String, input: String) -> AssistantResponse {
    let result = with_board_session(&board_id, |session| {
        let mut assistant = AiAssistant::new(session.audience());
        let reply = session
            .ask_assistant(&mut assistant, &input, &LocalLlm)
            .map_err(|err| FfiError::message(err.to_string()))?;
        let suggestions_json = serde_json::to_string(&reply.suggestions)
            .map_err(|err| FfiError::message(format!("suggestion encode failed: {err}")))?;
        Ok((reply.text.clone(), suggestions_json))
    });
    match result {
        Ok((text, suggestions_json)) => AssistantResponse {
            ok: true,
            text,
            suggestions_json,
            message: String::new(),
        },
        Err(err) => AssistantResponse {
            ok: false,
            text: String::new(),
            suggestions_json: "[]".to_string(),
            message: err.message,
        },
    }
}

/// Points, level and unlocked achievements of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressResponse {
    pub ok: bool,
    pub points: u64,
    pub level: u64,
    pub points_to_next_level: u64,
    /// Titles of unlocked achievements.
    pub achievements: Vec<String>,
    pub redirect: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveItem {
    pub note_id: String,
    pub title: String,
    pub board_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResponse {
    pub items: Vec<ArchiveItem>,
    pub redirect: Option<String>,
    pub message: String,
}

/// Starts a subscription checkout; the returned `message` is the URL.
#[flutter_rust_bridge::frb(sync)]
pub fn start_checkout(origin_url: String) -> ActionResponse {
    let integrations = Integrations::local();
    let result = with_app_state(|state| {
        subscribe(
            state.current_user(),
            integrations.checkout.as_ref(),
            origin_url.trim(),
        )
        .map_err(|err| match err {
            BillingError::LoginRequired => FfiError {
                message: err.to_string(),
                redirect: Some(Page::Landing.as_str().to_string()),
            },
            other => FfiError::message(other.to_string()),
        })
    });
    match result {
        Ok(url) => ActionResponse::success(url, None),
        Err(err) => ActionResponse::failure(err),
    }
}

/// Gamification panel for the signed-in user.
#[flutter_rust_bridge::frb(sync)]
pub fn user_progress() -> ProgressResponse {
    let result = with_page(Page::Profile, |conn, user, audience| {
        let filter = NoteFilter {
            created_by: Some(user.email.clone()),
            ..NoteFilter::default()
        };
        let notes = SqliteNoteRepository::new(conn)
            .filter_notes(&filter, None)
            .map_err(|err| FfiError::message(err.to_string()))?;
        Ok(progress(&notes, audience))
    });
    match result {
        Ok(summary) => ProgressResponse {
            ok: true,
            points: summary.points,
            level: summary.level,
            points_to_next_level: summary.points_to_next_level,
            achievements: summary
                .achievements
                .iter()
                .map(|achievement| achievement.title.to_string())
                .collect(),
            redirect: None,
            message: String::new(),
        },
        Err(err) => ProgressResponse {
            ok: false,
            points: 0,
            level: 0,
            points_to_next_level: 0,
            achievements: Vec::new(),
            redirect: err.redirect,
            message: err.message,
        },
    }
}

/// Archived notes of the signed-in user matching `query`.
#[flutter_rust_bridge::frb(sync)]
pub fn list_archive(query: String) -> ArchiveResponse {
    let result = with_page(Page::Archive, |conn, user, _audience| {
        let service = ArchiveService::new(
            SqliteBoardRepository::new(conn),
            SqliteNoteRepository::new(conn),
        );
        let archived = service
            .archived_notes(&user.email)
            .map_err(|err| FfiError::message(err.to_string()))?;
        Ok(search_archive(&archived, &query)
            .into_iter()
            .map(|item| ArchiveItem {
                note_id: item.note.id.to_string(),
                title: item.note.title.clone(),
                board_name: item.board_name.clone(),
            })
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => ArchiveResponse {
            message: format!("{} archived note(s).", items.len()),
            items,
            redirect: None,
        },
        Err(err) => ArchiveResponse {
            items: Vec::new(),
            redirect: err.redirect,
            message: err.message,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn restore_note(note_id: String) -> ActionResponse {
    let result = parse_id(&note_id, "note_id").and_then(|id: NoteId| {
        with_page(Page::Archive, |conn, user, _audience| {
            ArchiveService::new(
                SqliteBoardRepository::new(conn),
                SqliteNoteRepository::new(conn),
            )
            .restore(id, &user.email)
            .map_err(|err| FfiError::message(err.to_string()))
        })
    });
    match result {
        Ok(note) => ActionResponse::success("Note restored.", Some(note.id.to_string())),
        Err(err) => ActionResponse::failure(err),
    }
}

#[derive(Debug)]
struct FfiError {
    message: String,
    redirect: Option<String>,
}

impl FfiError {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            redirect: None,
        }
    }
}

impl From<SessionError> for FfiError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::Redirect(page) => Self {
                message: format!("redirect to {}", page.as_str()),
                redirect: Some(page.as_str().to_string()),
            },
            other => Self::message(other.to_string()),
        }
    }
}

fn resolve_store_path() -> PathBuf {
    STORE_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("STICKYBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_FILE_NAME)
        })
        .clone()
}

fn open_store() -> Result<Connection, FfiError> {
    open_db(resolve_store_path())
        .map_err(|err| FfiError::message(format!("store open failed: {err}")))
}

fn with_app_state<T>(
    f: impl FnOnce(&mut StoreState<'_>) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    let conn = open_store()?;
    let mut state = load_state(&conn)?;
    f(&mut state)
}

type StoreState<'conn> = AppState<SqliteUserRepository<'conn>, SqlitePreferenceStore<'conn>>;

fn load_state(conn: &Connection) -> Result<StoreState<'_>, FfiError> {
    AppState::bootstrap(
        SqliteUserRepository::new(conn),
        SqlitePreferenceStore::new(conn),
        Default::default(),
    )
    .map_err(|err| FfiError::message(err.to_string()))
}

/// Signed-in user, once the route guard allows `page`.
fn guarded_user<'s>(state: &'s StoreState<'_>, page: Page) -> Result<&'s User, FfiError> {
    if let Err(err) = state.guard(page) {
        warn!("event=ffi_guard module=ffi status=redirect page={}", page.as_str());
        return Err(err.into());
    }
    Ok(state.require_user()?)
}

/// Runs `f` for the signed-in user once the route guard allows `page`.
fn with_page<T>(
    page: Page,
    f: impl FnOnce(&Connection, &User, AudienceMode) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    let conn = open_store()?;
    let state = load_state(&conn)?;
    let user = guarded_user(&state, page)?;
    f(&conn, user, state.audience())
}

fn with_board_session<T>(
    board_id: &str,
    f: impl FnOnce(&mut BoardSession<SqliteNoteRepository<'_>>) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    let board_id: Option<BoardId> = Uuid::parse_str(board_id.trim()).ok();
    let conn = open_store()?;
    let state = load_state(&conn)?;
    let user = guarded_user(&state, Page::Board)?;
    let mut session = BoardSession::open(
        &SqliteBoardRepository::new(&conn),
        SqliteNoteRepository::new(&conn),
        state.preferences(),
        user,
        state.audience(),
        board_id,
    )?;
    f(&mut session)
}

enum DropTarget {
    Eisenhower(EisenhowerQuadrant),
    Decision(DecisionQuadrant),
}

fn parse_drop_target(matrix: &str, quadrant: &str) -> Result<DropTarget, FfiError> {
    let key = quadrant.trim();
    let target = match ViewMode::parse(matrix.trim()) {
        Some(ViewMode::Eisenhower) => EisenhowerQuadrant::parse(key).map(DropTarget::Eisenhower),
        Some(ViewMode::Decision) => DecisionQuadrant::parse(key).map(DropTarget::Decision),
        _ => return Err(FfiError::message(format!("unknown matrix `{matrix}`"))),
    };
    target.ok_or_else(|| FfiError::message(format!("unknown quadrant `{quadrant}`")))
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, FfiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| FfiError::message(format!("invalid {field} `{raw}`")))
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        board_view, configure_store_path, core_version, drop_note, guarded_user, init_logging,
        load_state, parse_drop_target, ping, restore_note, DropTarget,
    };
    use stickyboard_core::view::{DecisionQuadrant, EisenhowerQuadrant};
    use stickyboard_core::{open_db_in_memory, Page, SubscriptionStatus};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_store_path_rejects_blank() {
        assert!(!configure_store_path("   ".to_string()).is_empty());
    }

    #[test]
    fn board_view_rejects_unknown_mode_before_touching_store() {
        let response = board_view(
            "not-a-board".to_string(),
            "kanban".to_string(),
            String::new(),
            None,
            "2024-01-01".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("kanban"));
    }

    #[test]
    fn restore_rejects_malformed_id() {
        let response = restore_note("nope".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("note_id"));
    }

    #[test]
    fn guard_redirects_by_session_and_plan() {
        let conn = open_db_in_memory().unwrap();
        let mut state = load_state(&conn).unwrap();

        let signed_out = guarded_user(&state, Page::Boards).err().unwrap();
        assert_eq!(signed_out.redirect.as_deref(), Some("landing"));

        state.login("guard@example.com", None).unwrap();
        let free = guarded_user(&state, Page::Board).err().unwrap();
        assert_eq!(free.redirect.as_deref(), Some("pricing"));

        state.set_subscription(SubscriptionStatus::Pro).unwrap();
        let user = guarded_user(&state, Page::Board).ok().unwrap();
        assert_eq!(user.email, "guard@example.com");
    }

    #[test]
    fn drop_target_parses_matrix_and_quadrant() {
        assert!(matches!(
            parse_drop_target("eisenhower", " do "),
            Ok(DropTarget::Eisenhower(EisenhowerQuadrant::Do))
        ));
        assert!(matches!(
            parse_drop_target("decision", "quick_wins"),
            Ok(DropTarget::Decision(DecisionQuadrant::QuickWins))
        ));
        let unknown_matrix = parse_drop_target("priority", "do").err().unwrap();
        assert!(unknown_matrix.message.contains("priority"));
        let unknown_quadrant = parse_drop_target("decision", "do").err().unwrap();
        assert!(unknown_quadrant.message.contains("do"));
    }

    #[test]
    fn drop_rejects_unknown_quadrant_before_touching_store() {
        let response = drop_note(
            "not-a-board".to_string(),
            uuid::Uuid::new_v4().to_string(),
            "eisenhower".to_string(),
            "someday".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("someday"));
    }
}
