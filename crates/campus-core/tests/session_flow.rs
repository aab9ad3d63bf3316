//! Sign-in, guard and sign-out working together over a mock backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use campus_core::api::auth;
use campus_core::gateway::Gateway;
use campus_core::guard::{Denial, GuardState, RemoteTokenValidator, RouteGuard};
use campus_core::navigation::{Navigator, RecordingNavigator, Route};
use campus_core::session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(
    server: &MockServer,
    store: Arc<dyn SessionStore>,
    nav: Arc<RecordingNavigator>,
) -> Gateway {
    Gateway::new(
        server.uri().parse().unwrap(),
        None,
        store,
        nav as Arc<dyn Navigator>,
    )
    .unwrap()
}

async fn mount_login(server: &MockServer, token: &str, is_admin: bool) {
    Mock::given(method("POST"))
        .and(path("/login/email"))
        .and(body_json(json!({"email": "ops@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": token,
            "user_info": {"is_admin": is_admin}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_non_admin_sign_in_is_stored_and_guarded() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", false).await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let nav = Arc::new(RecordingNavigator::new());
    let gw = gateway(&server, Arc::clone(&store), Arc::clone(&nav));

    let outcome = auth::sign_in(&gw, "ops@example.com", "pw").await.unwrap();
    assert_eq!(outcome.landing, Route::Unauthorized);
    assert_eq!(store.load().unwrap(), Some(Session::new("T1", false)));

    let guard = RouteGuard::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn Navigator>);
    let ran = AtomicBool::new(false);
    let result = guard
        .render(|| async { ran.store(true, Ordering::SeqCst) })
        .await;

    assert_eq!(result, Err(Denial::InsufficientPrivilege));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(nav.visits(), vec![Route::Unauthorized, Route::Unauthorized]);
}

#[tokio::test]
async fn test_admin_sign_in_opens_protected_views() {
    let server = MockServer::start().await;
    mount_login(&server, "T2", true).await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let nav = Arc::new(RecordingNavigator::new());
    let gw = gateway(&server, Arc::clone(&store), Arc::clone(&nav));

    let outcome = auth::sign_in(&gw, "ops@example.com", "pw").await.unwrap();
    assert_eq!(outcome.landing, Route::Root);

    let guard = RouteGuard::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn Navigator>);
    assert_eq!(guard.render(|| async { 7 }).await, Ok(7));
    assert_eq!(nav.visits(), vec![Route::Root]);
}

#[tokio::test]
async fn test_rejected_credentials_leave_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/email"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let nav = Arc::new(RecordingNavigator::new());
    let gw = gateway(&server, Arc::clone(&store), Arc::clone(&nav));

    let err = auth::sign_in(&gw, "ops@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(auth::sign_in_failure_message(&err), "Invalid email or password");
    assert_eq!(store.load().unwrap(), None);
    // Nothing was cleared, so nothing redirects.
    assert!(nav.visits().is_empty());
}

#[tokio::test]
async fn test_sign_out_then_guard_requires_sign_in() {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_session("T3", true));
    let nav = Arc::new(RecordingNavigator::new());
    let server = MockServer::start().await;
    let gw = gateway(&server, Arc::clone(&store), Arc::clone(&nav));

    assert!(auth::sign_out(&gw).unwrap());
    assert!(!auth::sign_out(&gw).unwrap());

    let guard = RouteGuard::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn Navigator>);
    assert_eq!(guard.mount().await, GuardState::Denied(Denial::NoSession));
    assert_eq!(nav.count(Route::SignIn), 3);
}

#[tokio::test]
async fn test_remote_validation_rejects_revoked_token_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/validate"))
        .and(header("authorization", "Bearer revoked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_session("revoked", true));
    let nav = Arc::new(RecordingNavigator::new());
    let gw = Arc::new(gateway(&server, Arc::clone(&store), Arc::clone(&nav)));

    let states = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&states);
    let guard = RouteGuard::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn Navigator>)
        .with_validator(Arc::new(RemoteTokenValidator::new(gw, "/auth/validate")))
        .on_state(move |s| seen.lock().unwrap().push(s));

    assert_eq!(
        guard.mount().await,
        GuardState::Denied(Denial::SessionInvalid)
    );
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(nav.visits(), vec![Route::SignIn]);
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            GuardState::Validating,
            GuardState::Denied(Denial::SessionInvalid)
        ]
    );
}

#[tokio::test]
async fn test_remote_validation_accepts_live_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/validate"))
        .and(header("authorization", "Bearer live"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_session("live", true));
    let nav = Arc::new(RecordingNavigator::new());
    let gw = Arc::new(gateway(&server, Arc::clone(&store), Arc::clone(&nav)));

    let guard = RouteGuard::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn Navigator>)
        .with_validator(Arc::new(RemoteTokenValidator::new(gw, "/auth/validate")));

    assert_eq!(guard.mount().await, GuardState::Allowed);
    assert!(nav.visits().is_empty());
}

#[tokio::test]
async fn test_file_store_session_survives_gateway_rebuild() {
    let server = MockServer::start().await;
    mount_login(&server, "T4", true).await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(header("authorization", "Bearer T4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");

    {
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(file.clone()));
        let gw = gateway(&server, store, Arc::new(RecordingNavigator::new()));
        auth::sign_in(&gw, "ops@example.com", "pw").await.unwrap();
    }

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(file.clone()));
    let gw = gateway(&server, store, Arc::new(RecordingNavigator::new()));
    campus_core::api::courses::list(&gw).await.unwrap();
}

#[tokio::test]
async fn test_sign_in_recovers_from_corrupt_session_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/email"))
        .and(wiremock::matchers::header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "T5",
            "user_info": {"is_admin": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    std::fs::write(&file, "{not json").unwrap();

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(file.clone()));
    let nav = Arc::new(RecordingNavigator::new());
    let guard = RouteGuard::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn Navigator>);
    assert_eq!(guard.mount().await, GuardState::Denied(Denial::NoSession));

    let gw = gateway(&server, Arc::clone(&store), Arc::clone(&nav));
    let outcome = auth::sign_in(&gw, "ops@example.com", "pw").await.unwrap();

    assert_eq!(outcome.landing, Route::Root);
    assert_eq!(store.load().unwrap(), Some(Session::new("T5", true)));
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}
