//! In-process identity provider and document store.
//!
//! These mirror the hosted backend closely enough to drive the holders end
//! to end: the identity side enforces the provider's account rules and
//! reports the same error codes, and the store applies equality filters and
//! ordering the way the hosted query engine does. Both expose hooks to
//! inject failures, hold calls in flight, and force external state changes.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;

use taskdesk_proto::query::compare_by;
use taskdesk_proto::task::{TaskDocument, TaskDocumentPatch, TaskId};

use super::{
    AuthState, AuthSubscription, DocumentStore, IdentityProvider, ProviderError, ProviderUser,
    RemoteQuery, StoredDocument,
};
use crate::forms::is_plausible_email;

/// Minimum password length the provider accepts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Consecutive failed sign-ins for one email before it is throttled.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// Holds calls in flight while closed.
#[derive(Debug)]
struct Gate(watch::Sender<bool>);

impl Gate {
    fn new() -> Self {
        Self(watch::Sender::new(true))
    }

    fn set_open(&self, open: bool) {
        self.0.send_replace(open);
    }

    async fn pass(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: Option<String>,
    display_name: Option<String>,
    created: chrono::DateTime<Utc>,
    disabled: bool,
    failed_attempts: u32,
}

impl Account {
    fn projection(&self, share_email: bool, share_profile: bool) -> ProviderUser {
        ProviderUser {
            uid: self.uid.clone(),
            display_name: self.display_name.clone().filter(|_| share_profile),
            email: share_email.then(|| self.email.clone()),
            creation_time: Some(self.created),
        }
    }
}

/// The account the federated consent flow signs in as.
#[derive(Debug, Clone)]
struct FederatedAccount {
    email: String,
    display_name: Option<String>,
}

#[derive(Debug, Default)]
struct IdentityInner {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    next_uid: u64,
    queued_failures: VecDeque<String>,
    federated: Option<FederatedAccount>,
    current: Option<ProviderUser>,
}

impl IdentityInner {
    fn take_failure(&mut self) -> Result<(), ProviderError> {
        self.queued_failures
            .pop_front()
            .map_or(Ok(()), |code| Err(ProviderError::new(code)))
    }

    fn allocate_uid(&mut self) -> String {
        self.next_uid += 1;
        format!("uid-{:04}", self.next_uid)
    }
}

/// In-process identity provider.
#[derive(Debug)]
pub struct MemoryIdentity {
    inner: Mutex<IdentityInner>,
    state: watch::Sender<AuthState>,
    gate: Gate,
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentity {
    /// A settled provider with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(AuthState::SignedOut)
    }

    /// A provider that has not yet settled; subscribers wait until
    /// [`settle`](Self::settle) or [`restore_session`](Self::restore_session).
    #[must_use]
    pub fn initializing() -> Self {
        Self::with_state(AuthState::Initializing)
    }

    fn with_state(state: AuthState) -> Self {
        Self {
            inner: Mutex::new(IdentityInner::default()),
            state: watch::Sender::new(state),
            gate: Gate::new(),
        }
    }

    /// Settles an initializing provider to "no session".
    pub fn settle(&self) {
        if matches!(*self.state.borrow(), AuthState::Initializing) {
            self.publish(None);
        }
    }

    /// Signs `email` in without credentials, as a persisted session would.
    /// Returns `false` if no such account exists.
    pub fn restore_session(&self, email: &str) -> bool {
        let user = {
            let inner = self.inner.lock();
            inner
                .accounts
                .get(&email.to_lowercase())
                .map(|account| account.projection(true, true))
        };
        let found = user.is_some();
        if found {
            self.publish(user);
        }
        found
    }

    /// Ends the session from outside the client, as a token expiry or a
    /// sign-out in another tab would.
    pub fn expire_session(&self) {
        self.publish(None);
    }

    /// Makes the next provider call fail with `code`.
    pub fn fail_next(&self, code: &str) {
        self.inner.lock().queued_failures.push_back(code.to_string());
    }

    /// Configures the account the federated consent flow returns. Without
    /// one, the flow behaves as if the user closed the window.
    pub fn set_federated_account(&self, email: &str, display_name: Option<&str>) {
        self.inner.lock().federated = Some(FederatedAccount {
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        });
    }

    /// Disables an account. Returns `false` if it does not exist.
    pub fn disable(&self, email: &str) -> bool {
        self.inner
            .lock()
            .accounts
            .get_mut(&email.to_lowercase())
            .map(|account| account.disabled = true)
            .is_some()
    }

    /// Holds every subsequent call until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.gate.set_open(false);
    }

    /// Releases held calls.
    pub fn resume(&self) {
        self.gate.set_open(true);
    }

    /// The account currently signed in, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<ProviderUser> {
        self.inner.lock().current.clone()
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.inner.lock().accounts.len()
    }

    fn publish(&self, user: Option<ProviderUser>) {
        self.inner.lock().current.clone_from(&user);
        let state = user.map_or(AuthState::SignedOut, AuthState::SignedIn);
        self.state.send_replace(state);
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderUser, ProviderError> {
        self.gate.pass().await;
        let user = {
            let mut inner = self.inner.lock();
            inner.take_failure()?;
            if !is_plausible_email(email) {
                return Err(ProviderError::new("auth/invalid-email"));
            }
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(ProviderError::new("auth/weak-password")
                    .with_detail("Password should be at least 6 characters"));
            }
            let key = email.to_lowercase();
            if inner.accounts.contains_key(&key) {
                return Err(ProviderError::new("auth/email-already-in-use"));
            }
            let account = Account {
                uid: inner.allocate_uid(),
                email: email.to_string(),
                password: Some(password.to_string()),
                display_name: display_name.map(str::to_string),
                created: Utc::now(),
                disabled: false,
                failed_attempts: 0,
            };
            let user = account.projection(true, true);
            inner.accounts.insert(key, account);
            user
        };
        tracing::debug!(uid = %user.uid, "memory identity: account created");
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, ProviderError> {
        self.gate.pass().await;
        let user = {
            let mut inner = self.inner.lock();
            inner.take_failure()?;
            if !is_plausible_email(email) {
                return Err(ProviderError::new("auth/invalid-email"));
            }
            let Some(account) = inner.accounts.get_mut(&email.to_lowercase()) else {
                return Err(ProviderError::new("auth/user-not-found"));
            };
            if account.disabled {
                return Err(ProviderError::new("auth/user-disabled"));
            }
            if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
                return Err(ProviderError::new("auth/too-many-requests"));
            }
            if account.password.as_deref() != Some(password) {
                account.failed_attempts += 1;
                return Err(ProviderError::new("auth/wrong-password"));
            }
            account.failed_attempts = 0;
            account.projection(true, true)
        };
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_federated(&self, scopes: &[&str]) -> Result<ProviderUser, ProviderError> {
        self.gate.pass().await;
        let user = {
            let mut inner = self.inner.lock();
            inner.take_failure()?;
            let Some(federated) = inner.federated.clone() else {
                return Err(ProviderError::new("auth/popup-closed-by-user"));
            };
            let key = federated.email.to_lowercase();
            if let Some(existing) = inner.accounts.get(&key) {
                if existing.password.is_some() {
                    return Err(ProviderError::new(
                        "auth/account-exists-with-different-credential",
                    ));
                }
                if existing.disabled {
                    return Err(ProviderError::new("auth/user-disabled"));
                }
            } else {
                let account = Account {
                    uid: inner.allocate_uid(),
                    email: federated.email.clone(),
                    password: None,
                    display_name: federated.display_name.clone(),
                    created: Utc::now(),
                    disabled: false,
                    failed_attempts: 0,
                };
                inner.accounts.insert(key.clone(), account);
            }
            let share_email = scopes.contains(&"email");
            let share_profile = scopes.contains(&"profile");
            inner
                .accounts
                .get(&key)
                .map(|account| account.projection(share_email, share_profile))
                .ok_or_else(|| ProviderError::new("auth/internal-error"))?
        };
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.gate.pass().await;
        self.inner.lock().take_failure()?;
        self.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.state.subscribe())
    }
}

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StoreInner {
    /// Collection name to documents in insertion order.
    collections: HashMap<String, Vec<StoredDocument>>,
    queued_failures: VecDeque<String>,
    offline: bool,
    last_query: Option<RemoteQuery>,
    writes: usize,
}

impl StoreInner {
    fn check_available(&mut self) -> Result<(), ProviderError> {
        if self.offline {
            return Err(ProviderError::new("unavailable").with_detail("client is offline"));
        }
        self.queued_failures
            .pop_front()
            .map_or(Ok(()), |code| Err(ProviderError::new(code)))
    }

    fn find_mut(&mut self, collection: &str, id: &TaskId) -> Option<&mut StoredDocument> {
        self.collections
            .get_mut(collection)?
            .iter_mut()
            .find(|doc| doc.id == *id)
    }
}

/// In-process document store.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    inner: Mutex<StoreInner>,
    gate: Gate,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            gate: Gate::new(),
        }
    }

    /// Inserts a document directly, bypassing the client. Used to seed data
    /// written by other users or earlier sessions.
    pub fn insert(&self, collection: &str, doc: TaskDocument) -> TaskId {
        let id = TaskId::generate();
        self.inner
            .lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                data: doc,
            });
        id
    }

    /// Reads a document directly, bypassing the client.
    #[must_use]
    pub fn document(&self, collection: &str, id: &TaskId) -> Option<TaskDocument> {
        let inner = self.inner.lock();
        inner
            .collections
            .get(collection)?
            .iter()
            .find(|doc| doc.id == *id)
            .map(|doc| doc.data.clone())
    }

    /// Number of documents in `collection`, including inactive ones.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.inner.lock().collections.get(collection).map_or(0, Vec::len)
    }

    /// Returns `true` if `collection` holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Switches the store offline (`unavailable`) or back online.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// Makes the next store call fail with `code`.
    pub fn fail_next(&self, code: &str) {
        self.inner.lock().queued_failures.push_back(code.to_string());
    }

    /// The last query the store executed.
    #[must_use]
    pub fn last_query(&self) -> Option<RemoteQuery> {
        self.inner.lock().last_query.clone()
    }

    /// Number of successful add/update calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    /// Holds every subsequent call until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.gate.set_open(false);
    }

    /// Releases held calls.
    pub fn resume(&self) {
        self.gate.set_open(true);
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, doc: TaskDocument) -> Result<TaskId, ProviderError> {
        self.gate.pass().await;
        let mut inner = self.inner.lock();
        inner.check_available()?;
        let id = TaskId::generate();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                data: doc,
            });
        inner.writes += 1;
        Ok(id)
    }

    async fn get(
        &self,
        collection: &str,
        id: &TaskId,
    ) -> Result<Option<StoredDocument>, ProviderError> {
        self.gate.pass().await;
        let mut inner = self.inner.lock();
        inner.check_available()?;
        Ok(inner.find_mut(collection, id).cloned())
    }

    async fn update(
        &self,
        collection: &str,
        id: &TaskId,
        patch: TaskDocumentPatch,
    ) -> Result<(), ProviderError> {
        self.gate.pass().await;
        let mut inner = self.inner.lock();
        inner.check_available()?;
        let Some(doc) = inner.find_mut(collection, id) else {
            return Err(ProviderError::new("not-found").with_detail(format!("no document {id}")));
        };
        doc.data.apply(&patch);
        inner.writes += 1;
        Ok(())
    }

    async fn query(&self, query: RemoteQuery) -> Result<Vec<StoredDocument>, ProviderError> {
        self.gate.pass().await;
        let mut inner = self.inner.lock();
        inner.check_available()?;
        let mut matched: Vec<StoredDocument> = inner
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.filters.iter().all(|f| f.matches(&doc.data)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some((key, order)) = query.order_by {
            matched.sort_by(|a, b| compare_by(&a.data, &b.data, key, order));
        }
        tracing::trace!(
            collection = %query.collection,
            filters = query.filters.len(),
            results = matched.len(),
            "memory store: query"
        );
        inner.last_query = Some(query);
        Ok(matched)
    }
}
