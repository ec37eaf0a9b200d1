//! Backend boundary: the identity provider and the document store.
//!
//! Both are traits so the holders can run against the hosted backend or the
//! in-process [`memory`] implementation used by demo mode and the tests.
//! Every call resolves to a `Result` whose error carries the provider's code
//! string; translating that code is the holders' job.

pub mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use taskdesk_proto::codes::{self, AuthCode};
use taskdesk_proto::query::{SortKey, SortOrder};
use taskdesk_proto::task::{TaskDocument, TaskDocumentPatch, TaskId, TaskStatus};

/// A failure reported by the identity provider or the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provider error {code}")]
pub struct ProviderError {
    /// Provider code string, e.g. `auth/wrong-password` or `unavailable`.
    pub code: String,
    /// Optional free-form detail from the provider.
    pub detail: Option<String>,
}

impl ProviderError {
    /// Creates an error with the given code and no detail.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: None,
        }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Classifies the code against the known auth code table.
    #[must_use]
    pub fn auth_code(&self) -> AuthCode {
        AuthCode::from_code(&self.code)
    }

    /// Returns `true` if this is a connectivity failure.
    #[must_use]
    pub fn is_network(&self) -> bool {
        codes::is_network_code(&self.code)
    }
}

/// The provider's view of a signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    /// Provider-assigned account id.
    pub uid: String,
    /// Profile display name, if set.
    pub display_name: Option<String>,
    /// Account email, if shared.
    pub email: Option<String>,
    /// Account creation time, if known.
    pub creation_time: Option<DateTime<Utc>>,
}

/// Auth state as published by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not yet determined whether a session exists.
    Initializing,
    /// No session.
    SignedOut,
    /// A session for this account.
    SignedIn(ProviderUser),
}

/// One auth-state notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session exists for this account.
    SignedIn(ProviderUser),
    /// No session.
    SignedOut,
}

/// A long-lived subscription to auth-state notifications.
///
/// The first call to [`next`](Self::next) yields the provider's current
/// settled state, waiting while the provider is still initializing. Each
/// later call waits for the next change. Rapid successive changes coalesce
/// into the latest one.
#[derive(Debug)]
pub struct AuthSubscription {
    rx: watch::Receiver<AuthState>,
    primed: bool,
}

impl AuthSubscription {
    /// Wraps a receiver on the provider's auth-state channel.
    #[must_use]
    pub const fn new(rx: watch::Receiver<AuthState>) -> Self {
        Self { rx, primed: false }
    }

    /// Waits for the next notification. Returns `None` once the provider
    /// side of the channel is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        if !self.primed {
            self.primed = true;
            let state = self
                .rx
                .wait_for(|state| !matches!(state, AuthState::Initializing))
                .await
                .ok()?
                .clone();
            return Self::event_for(state);
        }

        loop {
            self.rx.changed().await.ok()?;
            let state = self.rx.borrow_and_update().clone();
            if let Some(event) = Self::event_for(state) {
                return Some(event);
            }
        }
    }

    /// Returns the notification [`next`](Self::next) would yield, if one is
    /// already waiting, without blocking.
    pub fn try_next(&mut self) -> Option<AuthEvent> {
        if self.primed {
            if !self.rx.has_changed().unwrap_or(false) {
                return None;
            }
            let state = self.rx.borrow_and_update().clone();
            return Self::event_for(state);
        }
        let state = self.rx.borrow_and_update().clone();
        let event = Self::event_for(state);
        self.primed = event.is_some();
        event
    }

    /// Marks every state published so far as seen. Later calls only report
    /// changes made after this point.
    pub fn mark_seen(&mut self) {
        drop(self.rx.borrow_and_update());
        self.primed = true;
    }

    fn event_for(state: AuthState) -> Option<AuthEvent> {
        match state {
            AuthState::Initializing => None,
            AuthState::SignedOut => Some(AuthEvent::SignedOut),
            AuthState::SignedIn(user) => Some(AuthEvent::SignedIn(user)),
        }
    }
}

/// Scopes requested from the federated consent flow.
pub const FEDERATED_SCOPES: [&str; 2] = ["profile", "email"];

/// Account operations and the auth-state stream of an identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Creates an email/password account, sets its display name, and signs
    /// it in.
    fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> impl Future<Output = Result<ProviderUser, ProviderError>> + Send;

    /// Signs in with email and password.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<ProviderUser, ProviderError>> + Send;

    /// Runs the interactive federated consent flow with the given scopes.
    fn sign_in_federated(
        &self,
        scopes: &[&str],
    ) -> impl Future<Output = Result<ProviderUser, ProviderError>> + Send;

    /// Ends the current session.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Opens a new auth-state subscription.
    fn subscribe(&self) -> AuthSubscription;
}

/// A document together with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Store-assigned id.
    pub id: TaskId,
    /// Document fields.
    pub data: TaskDocument,
}

/// An equality filter on one task document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// `userId == value`
    UserId(String),
    /// `status == value`
    Status(TaskStatus),
    /// `isActive == value`
    IsActive(bool),
}

impl FieldFilter {
    /// Stored field this filter applies to.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::UserId(_) => "userId",
            Self::Status(_) => "status",
            Self::IsActive(_) => "isActive",
        }
    }

    /// Returns `true` if `doc` passes this filter.
    #[must_use]
    pub fn matches(&self, doc: &TaskDocument) -> bool {
        match self {
            Self::UserId(uid) => doc.user_id == *uid,
            Self::Status(status) => doc.status == *status,
            Self::IsActive(active) => doc.is_active == *active,
        }
    }
}

/// A filtered, optionally ordered query against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteQuery {
    /// Collection name.
    pub collection: String,
    /// Equality filters, all of which must match.
    pub filters: Vec<FieldFilter>,
    /// Single-field ordering, if any.
    pub order_by: Option<(SortKey, SortOrder)>,
}

impl RemoteQuery {
    /// An unfiltered, unordered query over `collection`.
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub const fn order_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.order_by = Some((key, order));
        self
    }

    /// Returns `true` if the query filters on `field`.
    #[must_use]
    pub fn filters_on(&self, field: &str) -> bool {
        self.filters.iter().any(|f| f.field_name() == field)
    }
}

/// Document operations against the task collection.
pub trait DocumentStore: Send + Sync {
    /// Adds a document and returns its new id.
    fn add(
        &self,
        collection: &str,
        doc: TaskDocument,
    ) -> impl Future<Output = Result<TaskId, ProviderError>> + Send;

    /// Fetches one document by id, `None` if absent.
    fn get(
        &self,
        collection: &str,
        id: &TaskId,
    ) -> impl Future<Output = Result<Option<StoredDocument>, ProviderError>> + Send;

    /// Writes the fields present in `patch`. Fails with `not-found` if the
    /// document does not exist.
    fn update(
        &self,
        collection: &str,
        id: &TaskId,
        patch: TaskDocumentPatch,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Runs a filtered query.
    fn query(
        &self,
        query: RemoteQuery,
    ) -> impl Future<Output = Result<Vec<StoredDocument>, ProviderError>> + Send;
}
