//! Pure list shaping: what the remote query asks for, what the client does
//! to the fetched set afterwards, and the page-level view filter.
//!
//! A status filter combined with the active-flag filter and an ordering
//! would need a composite index on the hosted store, so a status-filtered
//! list only filters by owner and status remotely. The client then drops
//! inactive tasks, sorts, and truncates. An unfiltered list filters by the
//! active flag and sorts remotely; the limit is always applied locally.

use taskdesk_proto::query::{SortKey, SortOrder, TaskQuery, compare_by};
use taskdesk_proto::task::{TASKS_COLLECTION, Task, TaskStatus};
use taskdesk_proto::user::User;

use crate::provider::{FieldFilter, RemoteQuery, StoredDocument};

/// Builds the remote query for `user_id`'s tasks under `query`.
#[must_use]
pub fn remote_query(user_id: &str, query: &TaskQuery) -> RemoteQuery {
    let remote =
        RemoteQuery::new(TASKS_COLLECTION).filter(FieldFilter::UserId(user_id.to_string()));
    match query.status {
        Some(status) => remote.filter(FieldFilter::Status(status)),
        None => remote
            .filter(FieldFilter::IsActive(true))
            .order_by(query.sort_key(), query.order()),
    }
}

/// Converts fetched documents into the local list for `query`.
///
/// A limit of zero means no cap.
#[must_use]
pub fn shape_fetched(docs: Vec<StoredDocument>, query: &TaskQuery, owner: &User) -> Vec<Task> {
    let mut tasks: Vec<Task> = docs
        .into_iter()
        .map(|doc| Task::from_document(doc.id, doc.data, owner))
        .collect();
    if query.status.is_some() {
        tasks.retain(|task| task.is_active);
        sort_tasks(&mut tasks, query.sort_key(), query.order());
    }
    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        tasks.truncate(limit);
    }
    tasks
}

/// Stable sort of `tasks` by `key` in direction `order`.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, order: SortOrder) {
    tasks.sort_by(|a, b| compare_by(a, b, key, order));
}

/// Status selector of the list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every status.
    #[default]
    All,
    /// One status.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Returns `true` if `status` passes.
    #[must_use]
    pub fn admits(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = taskdesk_proto::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Page-level view over the local list: a status selector plus a
/// case-insensitive search over title and description. Never touches the
/// backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalFilter {
    /// Status selector.
    pub status: StatusFilter,
    /// Search term, blank for none.
    pub search: String,
}

impl LocalFilter {
    /// The tasks passing both filters, in list order.
    #[must_use]
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks
            .iter()
            .filter(|task| self.status.admits(task.status) && task.matches_search(&self.search))
            .cloned()
            .collect()
    }

    /// Returns `true` if neither filter is set.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.status == StatusFilter::All && self.search.trim().is_empty()
    }
}
