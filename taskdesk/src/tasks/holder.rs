//! Task collection state holder.
//!
//! Keeps the signed-in user's task list in memory. `list` replaces the list
//! wholesale; `create`, `update` and `delete` patch it in place after the
//! backend write succeeds, without reading the collection back. Derived
//! views are computed from the list on every read.
//!
//! Overlapping operations are not serialized. Local patches apply in
//! completion order, and two concurrent updates of one task can interleave
//! their fetch and write steps.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use taskdesk_proto::query::TaskQuery;
use taskdesk_proto::task::{TASKS_COLLECTION, Task, TaskDocument, TaskDocumentPatch, TaskId, TaskStatus};
use taskdesk_proto::user::User;

use super::shaping::{self, LocalFilter};
use super::{NewTask, TaskError, TaskPatch, TaskStats, WriteOp, validate_description, validate_title};
use crate::loading::LoadingCounter;
use crate::notify::Notifier;
use crate::provider::DocumentStore;
use crate::session::SessionView;

/// Holds the signed-in user's tasks and mediates every task operation.
#[derive(Debug)]
pub struct TaskHolder<D> {
    store: Arc<D>,
    session: SessionView,
    tasks: RwLock<Vec<Task>>,
    loading: LoadingCounter,
    notifier: Notifier,
}

impl<D: DocumentStore> TaskHolder<D> {
    /// Creates an empty holder for the user signed in to `session`.
    pub fn new(store: Arc<D>, session: SessionView, notifier: Notifier) -> Self {
        Self {
            store,
            session,
            tasks: RwLock::new(Vec::new()),
            loading: LoadingCounter::default(),
            notifier,
        }
    }

    fn require_user(&self) -> Result<User, TaskError> {
        self.session
            .current_user()
            .ok_or(TaskError::Unauthenticated)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetches the user's tasks under `query` and replaces the local list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Unauthenticated`] without contacting the backend
    /// when signed out, or [`TaskError::Network`] / [`TaskError::QueryFailed`]
    /// if the query fails. The local list is unchanged on error.
    pub async fn list(&self, query: TaskQuery) -> Result<Vec<Task>, TaskError> {
        let user = self.require_user()?;
        let _loading = self.loading.enter();

        let remote = shaping::remote_query(&user.id, &query);
        let docs = self.store.query(remote).await.map_err(|e| {
            tracing::warn!(code = %e.code, "tasks: list query failed");
            TaskError::read(&e)
        })?;
        let tasks = shaping::shape_fetched(docs, &query, &user);

        tracing::debug!(
            count = tasks.len(),
            status = ?query.status,
            limit = ?query.limit,
            "tasks: local list replaced"
        );
        *self.tasks.write() = tasks.clone();
        Ok(tasks)
    }

    /// Fetches one task, checking that it belongs to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if absent, [`TaskError::Forbidden`] if
    /// owned by someone else, or a read error.
    pub async fn get(&self, id: &TaskId) -> Result<Task, TaskError> {
        let user = self.require_user()?;
        let _loading = self.loading.enter();
        self.fetch_owned(&user, id).await
    }

    async fn fetch_owned(&self, user: &User, id: &TaskId) -> Result<Task, TaskError> {
        let stored = self
            .store
            .get(TASKS_COLLECTION, id)
            .await
            .map_err(|e| {
                tracing::warn!(task = %id, code = %e.code, "tasks: fetch failed");
                TaskError::read(&e)
            })?
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;

        if stored.data.user_id != user.id {
            tracing::warn!(task = %id, uid = %user.id, "tasks: ownership mismatch");
            return Err(TaskError::Forbidden(id.clone()));
        }
        Ok(Task::from_document(stored.id, stored.data, user))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Creates a task and prepends it to the local list.
    ///
    /// Title and description are trimmed; status defaults to pending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Unauthenticated`], a validation error, or
    /// [`TaskError::WriteFailed`] / [`TaskError::Network`].
    pub async fn create(&self, new_task: NewTask) -> Result<Task, TaskError> {
        let result = self.try_create(new_task).await;
        self.announce(WriteOp::Create, result.as_ref().map(|task| task.title.as_str()));
        result
    }

    async fn try_create(&self, new_task: NewTask) -> Result<Task, TaskError> {
        let user = self.require_user()?;
        let title = validate_title(&new_task.title)?;
        let description = validate_description(new_task.description.as_deref().unwrap_or(""))?;
        let _loading = self.loading.enter();

        let now = Utc::now();
        let doc = TaskDocument {
            user_id: user.id.clone(),
            title,
            description,
            status: new_task.status.unwrap_or(TaskStatus::Pending),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = self
            .store
            .add(TASKS_COLLECTION, doc.clone())
            .await
            .map_err(|e| {
                tracing::warn!(code = %e.code, "tasks: create failed");
                TaskError::write(WriteOp::Create, &e)
            })?;

        let task = Task::from_document(id, doc, &user);
        self.tasks.write().insert(0, task.clone());
        tracing::info!(task = %task.id, "tasks: created");
        Ok(task)
    }

    /// Applies `patch` to a task after re-fetching and ownership-checking it,
    /// then replaces the task in place in the local list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`], [`TaskError::Forbidden`], a
    /// validation error, or a write error.
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let result = self.try_update(id, patch).await;
        self.announce(WriteOp::Update, result.as_ref().map(|task| task.title.as_str()));
        result
    }

    async fn try_update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let user = self.require_user()?;
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;
        let _loading = self.loading.enter();

        let existing = self.fetch_owned(&user, id).await?;
        let now = Utc::now();
        let doc_patch = TaskDocumentPatch {
            title,
            description,
            status: patch.status,
            ..TaskDocumentPatch::touch(now)
        };
        self.store
            .update(TASKS_COLLECTION, id, doc_patch.clone())
            .await
            .map_err(|e| {
                tracing::warn!(task = %id, code = %e.code, "tasks: update failed");
                TaskError::write(WriteOp::Update, &e)
            })?;

        let updated = Task {
            title: doc_patch.title.unwrap_or(existing.title),
            description: doc_patch.description.unwrap_or(existing.description),
            status: doc_patch.status.unwrap_or(existing.status),
            updated_at: now,
            ..existing
        };
        if let Some(slot) = self.tasks.write().iter_mut().find(|t| t.id == *id) {
            *slot = updated.clone();
        }
        tracing::info!(task = %id, status = %updated.status, "tasks: updated");
        Ok(updated)
    }

    /// Advances a task to the next status in the cycle.
    ///
    /// # Errors
    ///
    /// As for [`update`](Self::update), plus read errors when the task is not
    /// in the local list.
    pub async fn cycle_status(&self, id: &TaskId) -> Result<Task, TaskError> {
        let current = match self.find_local(id) {
            Some(task) => task.status,
            None => self.get(id).await?.status,
        };
        self.update(id, TaskPatch::status(current.next())).await
    }

    /// Logically deletes a task: marks it inactive remotely and removes it
    /// from the local list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`], [`TaskError::Forbidden`], or a write
    /// error.
    pub async fn delete(&self, id: &TaskId) -> Result<bool, TaskError> {
        let result = self.try_delete(id).await;
        self.announce(WriteOp::Delete, result.as_ref().map(String::as_str));
        result.map(|_| true)
    }

    async fn try_delete(&self, id: &TaskId) -> Result<String, TaskError> {
        let user = self.require_user()?;
        let _loading = self.loading.enter();

        let existing = self.fetch_owned(&user, id).await?;
        self.store
            .update(TASKS_COLLECTION, id, TaskDocumentPatch::deactivate(Utc::now()))
            .await
            .map_err(|e| {
                tracing::warn!(task = %id, code = %e.code, "tasks: delete failed");
                TaskError::write(WriteOp::Delete, &e)
            })?;

        self.tasks.write().retain(|t| t.id != *id);
        tracing::info!(task = %id, "tasks: deleted");
        Ok(existing.title)
    }

    fn announce(&self, op: WriteOp, outcome: Result<&str, &TaskError>) {
        match outcome {
            Ok(title) => {
                let (headline, description) = op.success_notice(title);
                self.notifier.success(headline, description);
            }
            Err(_) => {
                let (headline, description) = op.failure_notice();
                self.notifier.error(headline, description);
            }
        }
    }

    /// Re-runs [`list`](Self::list) in the background. Failures are logged,
    /// never reported.
    pub fn refresh(self: &Arc<Self>, query: TaskQuery) -> JoinHandle<()>
    where
        D: 'static,
    {
        let holder = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = holder.list(query).await {
                tracing::error!(error = %e, "tasks: refresh failed");
            }
        })
    }

    // -----------------------------------------------------------------------
    // Local state
    // -----------------------------------------------------------------------

    /// Empties the local list.
    pub fn clear(&self) {
        self.tasks.write().clear();
    }

    /// Snapshot of the local list.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    /// The local copy of one task, if present.
    #[must_use]
    pub fn find_local(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().iter().find(|t| t.id == *id).cloned()
    }

    /// Local tasks with `status`.
    #[must_use]
    pub fn by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.tasks
            .read()
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect()
    }

    /// Local pending tasks.
    #[must_use]
    pub fn pending(&self) -> Vec<Task> {
        self.by_status(TaskStatus::Pending)
    }

    /// Local in-progress tasks.
    #[must_use]
    pub fn in_progress(&self) -> Vec<Task> {
        self.by_status(TaskStatus::InProgress)
    }

    /// Local completed tasks.
    #[must_use]
    pub fn completed(&self) -> Vec<Task> {
        self.by_status(TaskStatus::Completed)
    }

    /// Counts over the local list.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        let tasks = self.tasks.read();
        let count = |status| tasks.iter().filter(|t| t.status == status).count();
        TaskStats {
            total: tasks.len(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }

    /// Local tasks passing a page-level filter.
    #[must_use]
    pub fn filtered(&self, filter: &LocalFilter) -> Vec<Task> {
        filter.apply(&self.tasks.read())
    }

    /// Returns `true` while any task operation is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }
}
