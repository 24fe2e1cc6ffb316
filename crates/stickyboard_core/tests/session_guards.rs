use stickyboard_core::db::open_db_in_memory;
use stickyboard_core::repo::{
    BoardRepository, SqliteBoardRepository, SqliteNoteRepository, SqlitePreferenceStore,
    SqliteUserRepository,
};
use stickyboard_core::{
    AppState, AudienceMode, Board, BoardSession, Page, SessionError, SubscriptionStatus,
};
use uuid::Uuid;

fn redirect_of<T>(result: Result<T, SessionError>) -> Option<Page> {
    match result {
        Err(SessionError::Redirect(page)) => Some(page),
        _ => None,
    }
}

#[test]
fn signed_out_session_is_sent_to_landing() {
    let conn = open_db_in_memory().unwrap();
    let state = AppState::bootstrap(
        SqliteUserRepository::new(&conn),
        SqlitePreferenceStore::new(&conn),
        AudienceMode::Professional,
    )
    .unwrap();

    assert!(state.current_user().is_none());
    assert!(state.guard(Page::Landing).is_ok());
    assert_eq!(redirect_of(state.guard(Page::Boards)), Some(Page::Landing));
    assert_eq!(redirect_of(state.require_user()), Some(Page::Landing));
}

#[test]
fn free_user_hits_paywall_until_upgraded() {
    let conn = open_db_in_memory().unwrap();
    let mut state = AppState::bootstrap(
        SqliteUserRepository::new(&conn),
        SqlitePreferenceStore::new(&conn),
        AudienceMode::Professional,
    )
    .unwrap();

    let user = state.login("casey@example.com", Some("Casey")).unwrap();
    assert_eq!(user.subscription_status, SubscriptionStatus::Free);
    assert_eq!(redirect_of(state.guard(Page::Board)), Some(Page::Pricing));
    assert!(state.guard(Page::Pricing).is_ok());

    state.set_subscription(SubscriptionStatus::Pro).unwrap();
    assert!(state.guard(Page::Board).is_ok());
    assert_eq!(redirect_of(state.guard(Page::Pricing)), Some(Page::Boards));
}

#[test]
fn session_survives_a_fresh_bootstrap() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut state = AppState::bootstrap(
            SqliteUserRepository::new(&conn),
            SqlitePreferenceStore::new(&conn),
            AudienceMode::Professional,
        )
        .unwrap();
        state.login("casey@example.com", None).unwrap();
        state.set_audience_mode(AudienceMode::Student).unwrap();
    }

    let mut state = AppState::bootstrap(
        SqliteUserRepository::new(&conn),
        SqlitePreferenceStore::new(&conn),
        AudienceMode::Professional,
    )
    .unwrap();
    assert_eq!(
        state.current_user().map(|user| user.email.as_str()),
        Some("casey@example.com")
    );
    assert_eq!(state.audience(), AudienceMode::Student);

    state.logout().unwrap();
    assert!(state.current_user().is_none());
    assert_eq!(state.audience(), AudienceMode::Professional);
}

#[test]
fn onboarding_completes_once() {
    let conn = open_db_in_memory().unwrap();
    let mut state = AppState::bootstrap(
        SqliteUserRepository::new(&conn),
        SqlitePreferenceStore::new(&conn),
        AudienceMode::Professional,
    )
    .unwrap();
    state.login("casey@example.com", None).unwrap();

    assert!(state.complete_onboarding().unwrap());
    assert!(!state.complete_onboarding().unwrap());
    assert!(state.current_user().unwrap().has_seen_onboarding);
}

#[test]
fn board_page_redirects_for_missing_or_foreign_boards() {
    let conn = open_db_in_memory().unwrap();
    let mut state = AppState::bootstrap(
        SqliteUserRepository::new(&conn),
        SqlitePreferenceStore::new(&conn),
        AudienceMode::Professional,
    )
    .unwrap();
    state.login("casey@example.com", None).unwrap();
    let boards = SqliteBoardRepository::new(&conn);
    let foreign = boards
        .create_board(&Board::new("Not yours", "someone@example.com"))
        .unwrap();
    let user = state.current_user().unwrap().clone();

    for board_id in [None, Some(Uuid::new_v4()), Some(foreign.id)] {
        let opened = BoardSession::open(
            &boards,
            SqliteNoteRepository::new(&conn),
            state.preferences(),
            &user,
            state.audience(),
            board_id,
        );
        assert_eq!(redirect_of(opened), Some(Page::Boards));
    }
    assert_eq!(state.preferences().last_board_id().unwrap(), None);
}
