//! Session state holder.
//!
//! Mirrors the identity provider's auth state into a local [`User`]
//! projection. The four account operations update the projection directly on
//! success; a listener task owned by the holder applies auth-state
//! notifications as well, so changes made outside the client (token expiry,
//! a sign-out in another tab) are picked up.
//!
//! Both paths go through one shared cursor on the provider's auth stream. An
//! operation marks every notification published up to its completion as
//! seen, so the listener never replays a state an operation already
//! superseded (a failed sign-out stays signed out locally).
//!
//! The admin role is derived from an email allow-list on every rebuild of the
//! projection. It is advisory presentation state, not an authorization
//! boundary: access control belongs to the backend's own rules.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

use taskdesk_proto::codes::AuthCode;
use taskdesk_proto::user::{DEFAULT_USER_NAME, User, UserRole};

use crate::loading::LoadingCounter;
use crate::provider::{
    AuthEvent, AuthSubscription, FEDERATED_SCOPES, IdentityProvider, ProviderError, ProviderUser,
};

/// Emails that project to [`UserRole::Admin`] unless configured otherwise.
pub const DEFAULT_ADMIN_EMAILS: [&str; 2] = ["admin@tuapp.com", "tu-email@gmail.com"];

/// A session operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The provider refused the request; the code selects the message.
    #[error("{0}")]
    Rejected(AuthCode),

    /// The provider could not be reached.
    #[error("{}", AuthCode::NetworkRequestFailed.message())]
    Network,
}

impl SessionError {
    /// The provider code behind this error.
    #[must_use]
    pub fn code(&self) -> AuthCode {
        match self {
            Self::Rejected(code) => code.clone(),
            Self::Network => AuthCode::NetworkRequestFailed,
        }
    }
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        if err.is_network() {
            Self::Network
        } else {
            Self::Rejected(err.auth_code())
        }
    }
}

/// Email/password sign-in credentials.
#[derive(Clone)]
pub struct LoginCredentials {
    /// Account email.
    pub email: String,
    /// Password, wiped from memory on drop.
    pub password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Creates credentials from an email and password.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account registration credentials.
#[derive(Clone)]
pub struct RegisterCredentials {
    /// Account email.
    pub email: String,
    /// Password, wiped from memory on drop.
    pub password: Zeroizing<String>,
    /// Optional display name.
    pub name: Option<String>,
}

impl RegisterCredentials {
    /// Creates credentials without a display name.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
            name: None,
        }
    }

    /// Sets the display name. A blank name is treated as absent.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = (!name.trim().is_empty()).then_some(name);
        self
    }
}

impl std::fmt::Debug for RegisterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Maps emails to the advisory role.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    admin_emails: Vec<String>,
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAILS)
    }
}

impl RoleResolver {
    /// A resolver with the given admin allow-list.
    pub fn new<S: AsRef<str>>(admin_emails: impl IntoIterator<Item = S>) -> Self {
        Self {
            admin_emails: admin_emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// The role for `email`. Comparison ignores case.
    #[must_use]
    pub fn role_for(&self, email: &str) -> UserRole {
        let email = email.trim().to_lowercase();
        if !email.is_empty() && self.admin_emails.contains(&email) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    /// Builds the local projection for a provider account. `name` overrides
    /// the provider's display name when given.
    #[must_use]
    pub fn project(&self, account: &ProviderUser, name: Option<&str>) -> User {
        let now = Utc::now();
        let email = account.email.clone().unwrap_or_default();
        let name = name
            .or(account.display_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_USER_NAME)
            .to_string();
        User {
            id: account.uid.clone(),
            name,
            role: self.role_for(&email),
            email,
            is_active: true,
            created_at: account.creation_time.unwrap_or(now),
            updated_at: now,
        }
    }
}

/// State shared between the holder, its listener task and [`SessionView`]s.
#[derive(Debug)]
struct SessionShared {
    user: watch::Sender<Option<User>>,
    roles: RoleResolver,
    loading: LoadingCounter,
    cursor: Mutex<AuthSubscription>,
}

impl SessionShared {
    /// Applies the outcome of an account operation and marks the provider
    /// notifications it produced as seen.
    fn apply_local(&self, user: Option<User>) {
        let mut cursor = self.cursor.lock();
        cursor.mark_seen();
        self.replace_user(user);
    }

    /// Applies a waiting provider notification, if any is still unseen.
    fn apply_pending(&self) {
        let mut cursor = self.cursor.lock();
        let Some(event) = cursor.try_next() else {
            return;
        };
        let user = match event {
            AuthEvent::SignedIn(account) => Some(self.roles.project(&account, None)),
            AuthEvent::SignedOut => None,
        };
        self.replace_user(user);
    }

    fn replace_user(&self, user: Option<User>) {
        tracing::debug!(
            uid = user.as_ref().map(|u| u.id.as_str()),
            "session: user projection replaced"
        );
        self.user.send_replace(user);
    }
}

/// Read-only view of the session, handed to code that must know who is
/// signed in but must not change it.
#[derive(Debug, Clone)]
pub struct SessionView {
    shared: Arc<SessionShared>,
}

impl SessionView {
    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.shared.user.borrow().clone()
    }

    /// Returns `true` while a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.shared.user.borrow().is_some()
    }

    /// Returns `true` if the signed-in user has the advisory admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.shared
            .user
            .borrow()
            .as_ref()
            .is_some_and(|u| u.role == UserRole::Admin)
    }

    /// Returns `true` if the signed-in user has the plain user role.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.shared
            .user
            .borrow()
            .as_ref()
            .is_some_and(|u| u.role == UserRole::User)
    }

    /// Returns `true` while any session operation is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.loading.is_loading()
    }

    /// Initials for the header avatar, `"U"` when signed out.
    #[must_use]
    pub fn user_initials(&self) -> String {
        self.shared
            .user
            .borrow()
            .as_ref()
            .map_or_else(|| "U".to_string(), User::initials)
    }

    /// Receives every change to the user projection.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.shared.user.subscribe()
    }
}

/// Owns the session: account operations plus the auth-state listener.
///
/// Must be created inside a Tokio runtime. The listener task is aborted when
/// the holder is dropped.
#[derive(Debug)]
pub struct SessionHolder<I> {
    provider: Arc<I>,
    view: SessionView,
    listener: JoinHandle<()>,
}

impl<I: IdentityProvider> SessionHolder<I> {
    /// Creates the holder and starts listening to `provider`'s auth state.
    pub fn new(provider: Arc<I>, roles: RoleResolver) -> Self {
        let shared = Arc::new(SessionShared {
            user: watch::Sender::new(None),
            roles,
            loading: LoadingCounter::default(),
            cursor: Mutex::new(provider.subscribe()),
        });

        // `wake` only signals that something was published; what gets applied
        // is read from the shared cursor.
        let mut wake = provider.subscribe();
        let listener_shared = Arc::clone(&shared);
        let listener = tokio::spawn(async move {
            while wake.next().await.is_some() {
                listener_shared.apply_pending();
            }
            tracing::debug!("session: auth state stream closed");
        });

        Self {
            provider,
            view: SessionView { shared },
            listener,
        }
    }

    /// A cloneable read-only view of this session.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.view.clone()
    }

    fn shared(&self) -> &SessionShared {
        &self.view.shared
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] with the provider's code, e.g.
    /// [`AuthCode::EmailAlreadyInUse`] or [`AuthCode::WeakPassword`].
    pub async fn register(&self, credentials: RegisterCredentials) -> Result<User, SessionError> {
        let _loading = self.shared().loading.enter();
        let name = credentials.name.as_deref().map(str::trim);
        let account = self
            .provider
            .create_user(credentials.email.trim(), &credentials.password, name)
            .await
            .inspect_err(|e| tracing::warn!(code = %e.code, "session: registration rejected"))?;
        Ok(self.signed_in(&account, name))
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] with the provider's code, e.g.
    /// [`AuthCode::WrongPassword`] or [`AuthCode::TooManyRequests`].
    pub async fn login(&self, credentials: LoginCredentials) -> Result<User, SessionError> {
        let _loading = self.shared().loading.enter();
        let account = self
            .provider
            .sign_in(credentials.email.trim(), &credentials.password)
            .await
            .inspect_err(|e| tracing::warn!(code = %e.code, "session: sign-in rejected"))?;
        Ok(self.signed_in(&account, None))
    }

    /// Signs in through the federated consent flow.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] with the provider's code, e.g.
    /// [`AuthCode::PopupClosedByUser`] or
    /// [`AuthCode::AccountExistsWithDifferentCredential`].
    pub async fn login_with_federated_provider(&self) -> Result<User, SessionError> {
        let _loading = self.shared().loading.enter();
        let account = self
            .provider
            .sign_in_federated(&FEDERATED_SCOPES)
            .await
            .inspect_err(|e| tracing::warn!(code = %e.code, "session: federated sign-in failed"))?;
        Ok(self.signed_in(&account, None))
    }

    /// Signs out. Local state is cleared whether or not the provider
    /// succeeds; a provider failure is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the provider failed to end its session.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _loading = self.shared().loading.enter();
        let result = self.provider.sign_out().await;
        self.shared().apply_local(None);
        match result {
            Ok(()) => {
                tracing::info!("session: signed out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(code = %e.code, "session: provider sign-out failed, local state cleared");
                Err(e.into())
            }
        }
    }

    fn signed_in(&self, account: &ProviderUser, name: Option<&str>) -> User {
        let user = self.shared().roles.project(account, name);
        tracing::info!(uid = %user.id, role = %user.role, "session: signed in");
        self.shared().apply_local(Some(user.clone()));
        user
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.view.current_user()
    }

    /// Returns `true` while a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.view.is_authenticated()
    }

    /// Returns `true` if the signed-in user has the advisory admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.view.is_admin()
    }

    /// Returns `true` if the signed-in user has the plain user role.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.view.is_user()
    }

    /// Returns `true` while any session operation is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.view.is_loading()
    }

    /// Receives every change to the user projection.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.view.subscribe()
    }

    /// The identity provider behind this session.
    #[must_use]
    pub const fn provider(&self) -> &Arc<I> {
        &self.provider
    }
}

impl<I> Drop for SessionHolder<I> {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
