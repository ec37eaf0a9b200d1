//! Integration tests for route guards and navigation.
//!
//! Guards consult the identity provider's auth-state stream, so these tests
//! sign in through a real session and watch where navigation lands.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use taskdesk::guards::{GuardDecision, GuardKind, LOGIN_PATH, ROOT_PATH};
use taskdesk::provider::IdentityProvider;
use taskdesk::provider::memory::MemoryIdentity;
use taskdesk::router::{Resolution, Route, Router};
use taskdesk::session::{LoginCredentials, RegisterCredentials, RoleResolver, SessionHolder};
use taskdesk_proto::task::TaskId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn signed_in() -> (Arc<MemoryIdentity>, SessionHolder<MemoryIdentity>) {
    let idp = Arc::new(MemoryIdentity::new());
    let session = SessionHolder::new(Arc::clone(&idp), RoleResolver::default());
    session
        .register(RegisterCredentials::new("a@x.com", "secret1").with_name("Ana"))
        .await
        .unwrap();
    (idp, session)
}

// ---------------------------------------------------------------------------
// Signed-out visitors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signed_out_root_redirects_to_login() {
    let idp = Arc::new(MemoryIdentity::new());
    let router = Router::new(Arc::clone(&idp));

    let nav = router.navigate("/").await.unwrap();

    assert_eq!(nav.route, Route::Login);
    assert_eq!(nav.redirects, [LOGIN_PATH]);
    assert_eq!(router.current(), Some(Route::Login));
}

#[tokio::test]
async fn signed_out_visitor_cannot_open_task_pages() {
    let idp = Arc::new(MemoryIdentity::new());
    let router = Router::new(Arc::clone(&idp));

    for path in ["/create", "/edit/abc"] {
        assert_eq!(
            router.resolve(path).await,
            Resolution::Redirect(LOGIN_PATH.to_string()),
            "{path}"
        );
    }
    assert_eq!(
        router.navigate("/auth/register").await.unwrap().route,
        Route::Register
    );
}

#[tokio::test]
async fn unknown_path_falls_back_to_login() {
    let idp = Arc::new(MemoryIdentity::new());
    let router = Router::new(Arc::clone(&idp));

    let nav = router.navigate("/tasks").await.unwrap();

    assert_eq!(nav.route, Route::Login);
}

// ---------------------------------------------------------------------------
// Signed-in users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signed_in_user_reaches_task_pages() {
    let (idp, _session) = signed_in().await;
    let router = Router::new(Arc::clone(&idp));

    assert_eq!(router.navigate("/").await.unwrap().route, Route::TaskList);
    assert_eq!(router.navigate("/create").await.unwrap().route, Route::CreateTask);
    assert_eq!(
        router.navigate("/edit/t-1").await.unwrap().route,
        Route::EditTask(TaskId::new("t-1"))
    );
}

#[tokio::test]
async fn signed_in_user_is_bounced_off_auth_pages() {
    let (idp, _session) = signed_in().await;
    let router = Router::new(Arc::clone(&idp));

    let nav = router.navigate(LOGIN_PATH).await.unwrap();

    assert_eq!(nav.route, Route::TaskList);
    assert_eq!(nav.redirects, [ROOT_PATH]);
}

#[tokio::test]
async fn unknown_path_when_signed_in_lands_on_list() {
    let (idp, _session) = signed_in().await;
    let router = Router::new(Arc::clone(&idp));

    let nav = router.navigate("/nowhere").await.unwrap();

    assert_eq!(nav.route, Route::TaskList);
    assert_eq!(nav.redirects, [LOGIN_PATH, ROOT_PATH]);
}

#[tokio::test]
async fn sign_out_then_sign_in_changes_guard_outcome() {
    let (idp, session) = signed_in().await;
    let router = Router::new(Arc::clone(&idp));

    session.logout().await.unwrap();
    assert_eq!(router.navigate("/").await.unwrap().route, Route::Login);

    session
        .login(LoginCredentials::new("a@x.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(router.navigate("/").await.unwrap().route, Route::TaskList);
}

// ---------------------------------------------------------------------------
// Guards and provider start-up
// ---------------------------------------------------------------------------

#[tokio::test]
async fn guard_waits_for_provider_to_settle() {
    let idp = Arc::new(MemoryIdentity::initializing());
    let guard = tokio::spawn({
        let idp = Arc::clone(&idp);
        async move { GuardKind::Authenticated.check(&*idp).await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!guard.is_finished());

    idp.create_user("a@x.com", "secret1", None).await.unwrap();
    assert_eq!(guard.await.unwrap(), GuardDecision::Permit);
}

#[tokio::test]
async fn navigation_waits_for_settled_state() {
    let idp = Arc::new(MemoryIdentity::initializing());
    let router = Arc::new(Router::new(Arc::clone(&idp)));
    let nav = tokio::spawn({
        let router = Arc::clone(&router);
        async move { router.navigate("/").await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    idp.settle();

    let nav = nav.await.unwrap().unwrap();
    assert_eq!(nav.route, Route::Login);
}
