//! Task model and the document shape stored in the `tasks` collection.
//!
//! A [`Task`] is the client-side record: it carries a denormalized copy of
//! the owning [`User`]. A [`TaskDocument`] is what the document store holds:
//! only the owner's id, plus the logical-delete flag. Field names serialize
//! in camelCase to match the stored fields
//! (`userId, title, description, status, isActive, createdAt, updatedAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UnknownVariant;
use crate::user::User;

/// Name of the document collection that holds tasks.
pub const TASKS_COLLECTION: &str = "tasks";

/// Maximum allowed task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum allowed task description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Provider-assigned task identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an id handed out by the document store.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh time-ordered id (UUID v7), the way the in-process
    /// store assigns them.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// All statuses in cycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// The next status in the cycle `pending -> in-progress -> completed -> pending`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// Stored/wire name (`"in-progress"` etc.).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label shown next to a task.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::InProgress => "En Progreso",
            Self::Completed => "Completada",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownVariant::new("status", other)),
        }
    }
}

/// A task as held in the client's local list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Provider-assigned id.
    pub id: TaskId,
    /// Denormalized copy of the owner.
    pub user: User,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description, empty when none was given.
    pub description: String,
    /// Workflow status.
    pub status: TaskStatus,
    /// `false` once logically deleted.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds the client record from a stored document, attaching `owner` as
    /// the denormalized user.
    #[must_use]
    pub fn from_document(id: TaskId, doc: TaskDocument, owner: &User) -> Self {
        Self {
            id,
            user: owner.clone(),
            title: doc.title,
            description: doc.description,
            status: doc.status,
            is_active: doc.is_active,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }

    /// Case-insensitive match of `term` against title and description.
    /// A blank term matches everything.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// A task as stored in the `tasks` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    /// Owner's user id.
    pub user_id: String,
    /// Title.
    pub title: String,
    /// Description, possibly empty.
    #[serde(default)]
    pub description: String,
    /// Status.
    pub status: TaskStatus,
    /// Logical-delete flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl TaskDocument {
    /// Applies a field patch in place. Absent fields are left untouched.
    pub fn apply(&mut self, patch: &TaskDocumentPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = patch.updated_at;
    }
}

/// A partial field update for a stored task. `updated_at` is always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocumentPatch {
    /// New title, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New active flag, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskDocumentPatch {
    /// A patch that only stamps `updated_at`.
    #[must_use]
    pub const fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            status: None,
            is_active: None,
            updated_at,
        }
    }

    /// The logical-delete patch.
    #[must_use]
    pub fn deactivate(updated_at: DateTime<Utc>) -> Self {
        Self {
            is_active: Some(false),
            ..Self::touch(updated_at)
        }
    }
}
