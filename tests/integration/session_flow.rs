//! Integration tests for the session state holder.
//!
//! Covers registration, email/password and federated sign-in, sign-out, the
//! in-flight loading flag, and the auth-state listener following session
//! changes made outside the client.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::sync::Arc;
use std::time::Duration;

use taskdesk::provider::IdentityProvider;
use taskdesk::provider::memory::{MAX_FAILED_ATTEMPTS, MemoryIdentity};
use taskdesk::session::{
    LoginCredentials, RegisterCredentials, RoleResolver, SessionError, SessionHolder,
};
use taskdesk_proto::codes::AuthCode;
use taskdesk_proto::result::AuthResult;
use taskdesk_proto::user::{DEFAULT_USER_NAME, UserRole};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_with(idp: &Arc<MemoryIdentity>) -> SessionHolder<MemoryIdentity> {
    SessionHolder::new(Arc::clone(idp), RoleResolver::default())
}

fn ana() -> RegisterCredentials {
    RegisterCredentials::new("a@x.com", "secret1").with_name("Ana")
}

/// Waits until `check` holds, failing the test after one second.
async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !check() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ---------------------------------------------------------------------------
// Registration and sign-in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_on_clean_backend_signs_in_plain_user() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);

    let result = AuthResult::from(session.register(ana()).await);

    assert!(result.success);
    let user = result.user.unwrap();
    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.name, "Ana");
    assert_eq!(user.role, UserRole::User);
    assert!(session.is_authenticated());
    assert!(session.is_user());
    assert!(!session.is_admin());
    assert_eq!(session.view().user_initials(), "A");
}

#[tokio::test]
async fn register_duplicate_email_is_rejected() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    session.logout().await.unwrap();

    let err = session.register(ana()).await.unwrap_err();

    assert_eq!(err, SessionError::Rejected(AuthCode::EmailAlreadyInUse));
    assert_eq!(err.to_string(), "Este email ya está registrado");
    assert!(!session.is_authenticated());
    assert_eq!(idp.account_count(), 1);
}

#[tokio::test]
async fn register_without_name_uses_default() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);

    let user = session
        .register(RegisterCredentials::new("b@x.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.name, DEFAULT_USER_NAME);
}

#[tokio::test]
async fn wrong_password_reports_translated_message() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    session.logout().await.unwrap();

    let result = AuthResult::from(
        session
            .login(LoginCredentials::new("a@x.com", "wrong-pass"))
            .await,
    );

    assert!(!result.success);
    assert!(result.user.is_none());
    assert_eq!(result.error.as_deref(), Some("Contraseña incorrecta"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn repeated_failures_are_throttled() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    session.logout().await.unwrap();

    for _ in 0..MAX_FAILED_ATTEMPTS {
        let err = session
            .login(LoginCredentials::new("a@x.com", "nope-nope"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), AuthCode::WrongPassword);
    }
    let err = session
        .login(LoginCredentials::new("a@x.com", "secret1"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), AuthCode::TooManyRequests);
}

#[tokio::test]
async fn login_email_is_case_insensitive_and_trimmed() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    session.logout().await.unwrap();

    let user = session
        .login(LoginCredentials::new("  A@X.com ", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.name, "Ana");
}

#[tokio::test]
async fn unknown_provider_code_falls_back_to_generic_message() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    idp.fail_next("auth/quota-exceeded");

    let err = session.register(ana()).await.unwrap_err();

    assert_eq!(err.code(), AuthCode::Unknown("auth/quota-exceeded".to_string()));
    assert_eq!(err.to_string(), "Error desconocido. Intenta nuevamente.");
}

#[tokio::test]
async fn admin_role_comes_from_configured_emails() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = SessionHolder::new(Arc::clone(&idp), RoleResolver::new(["Boss@X.com"]));

    let user = session
        .register(RegisterCredentials::new("boss@x.com", "secret1").with_name("Big Boss"))
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Admin);
    assert!(session.is_admin());
    assert_eq!(session.view().user_initials(), "BB");
}

// ---------------------------------------------------------------------------
// Federated sign-in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn federated_sign_in_projects_profile_and_email() {
    let idp = Arc::new(MemoryIdentity::new());
    idp.set_federated_account("g@gmail.com", Some("Google User"));
    let session = session_with(&idp);

    let user = session.login_with_federated_provider().await.unwrap();

    assert_eq!(user.email, "g@gmail.com");
    assert_eq!(user.name, "Google User");
    assert_eq!(user.role, UserRole::User);
}

#[tokio::test]
async fn federated_without_account_reports_closed_window() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);

    let err = session.login_with_federated_provider().await.unwrap_err();

    assert_eq!(err.code(), AuthCode::PopupClosedByUser);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn federated_email_owned_by_password_account_is_rejected() {
    let idp = Arc::new(MemoryIdentity::new());
    idp.set_federated_account("a@x.com", None);
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    session.logout().await.unwrap();

    let err = session.login_with_federated_provider().await.unwrap_err();

    assert_eq!(err.code(), AuthCode::AccountExistsWithDifferentCredential);
}

// ---------------------------------------------------------------------------
// Sign-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_clears_user() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();

    session.logout().await.unwrap();

    assert!(session.current_user().is_none());
    assert!(idp.current_user().is_none());
    assert_eq!(session.view().user_initials(), "U");
}

#[tokio::test]
async fn failed_logout_still_clears_local_state() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    idp.fail_next("auth/network-request-failed");

    let err = session.logout().await.unwrap_err();

    assert_eq!(err, SessionError::Network);
    assert!(!session.is_authenticated());
    // The provider still holds its session.
    assert!(idp.current_user().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_logout_is_not_undone_by_pending_notifications() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    idp.fail_next("auth/network-request-failed");

    session.logout().await.unwrap_err();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn external_change_after_failed_logout_is_still_applied() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    idp.fail_next("auth/network-request-failed");
    session.logout().await.unwrap_err();

    // The provider later ends its session on its own, then restores it.
    idp.expire_session();
    assert!(idp.restore_session("a@x.com"));

    let view = session.view();
    eventually(|| view.is_authenticated()).await;
    assert_eq!(session.current_user().unwrap().email, "a@x.com");
}

// ---------------------------------------------------------------------------
// Loading flag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn loading_flag_covers_in_flight_operation() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = Arc::new(session_with(&idp));
    let view = session.view();
    assert!(!view.is_loading());

    idp.pause();
    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.register(ana()).await }
    });
    eventually(|| view.is_loading()).await;
    assert!(!view.is_authenticated());

    idp.resume();
    pending.await.unwrap().unwrap();

    assert!(!view.is_loading());
    assert!(view.is_authenticated());
}

#[tokio::test]
async fn loading_flag_stays_set_until_last_operation_finishes() {
    let idp = Arc::new(MemoryIdentity::new());
    idp.set_federated_account("g@gmail.com", None);
    let session = Arc::new(session_with(&idp));
    let view = session.view();

    idp.pause();
    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.login_with_federated_provider().await }
    });
    let second = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.login_with_federated_provider().await }
    });
    eventually(|| view.is_loading()).await;

    idp.resume();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert!(!view.is_loading());
}

#[tokio::test]
async fn loading_flag_resets_after_failure() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);

    session
        .login(LoginCredentials::new("ghost@x.com", "secret1"))
        .await
        .unwrap_err();

    assert!(!session.is_loading());
}

// ---------------------------------------------------------------------------
// Auth-state listener
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listener_follows_sessions_changed_elsewhere() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    session.register(ana()).await.unwrap();
    session.logout().await.unwrap();
    let mut changes = session.subscribe();

    assert!(idp.restore_session("a@x.com"));
    let user = changes
        .wait_for(Option::is_some)
        .await
        .unwrap()
        .clone()
        .unwrap();
    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.name, "Ana");

    idp.expire_session();
    changes.wait_for(Option::is_none).await.unwrap();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn listener_picks_up_restored_session_after_settling() {
    let idp = Arc::new(MemoryIdentity::initializing());
    let session = session_with(&idp);
    assert!(!session.is_authenticated());

    idp.create_user("c@x.com", "secret1", Some("Carla"))
        .await
        .unwrap();
    let mut changes = session.subscribe();
    changes.wait_for(Option::is_some).await.unwrap();

    assert_eq!(session.current_user().unwrap().name, "Carla");
}

#[tokio::test]
async fn dropping_holder_stops_listener() {
    let idp = Arc::new(MemoryIdentity::new());
    let session = session_with(&idp);
    let view = session.view();
    drop(session);

    // Give the aborted listener a chance to run if it were still alive.
    idp.create_user("d@x.com", "secret1", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!view.is_authenticated());
}
