//! List query parameters and the ordering they describe.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UnknownVariant;
use crate::task::{Task, TaskDocument, TaskStatus};

/// Field a task list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Creation time (the default).
    #[default]
    CreatedAt,
    /// Last write time.
    UpdatedAt,
    /// Title, case-insensitive.
    Title,
}

impl SortKey {
    /// Stored field name this key orders by.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::Title => "title",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl std::str::FromStr for SortKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created" => Ok(Self::CreatedAt),
            "updatedAt" | "updated" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            other => Err(UnknownVariant::new("sort key", other)),
        }
    }
}

/// Direction of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first (the default).
    #[default]
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnknownVariant::new("sort order", other)),
        }
    }
}

/// Parameters shaping a single list query. Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Cap on the number of tasks returned.
    pub limit: Option<usize>,
    /// Ordering key, `createdAt` when absent.
    pub sort_by: Option<SortKey>,
    /// Ordering direction, `desc` when absent.
    pub sort_order: Option<SortOrder>,
}

impl TaskQuery {
    /// Restricts the query to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub const fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = Some(key);
        self.sort_order = Some(order);
        self
    }

    /// Ordering key with the default applied.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.sort_by.unwrap_or_default()
    }

    /// Ordering direction with the default applied.
    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

/// Anything that exposes the fields a [`SortKey`] orders by.
pub trait Sortable {
    /// Creation time.
    fn created_at(&self) -> DateTime<Utc>;
    /// Last write time.
    fn updated_at(&self) -> DateTime<Utc>;
    /// Title.
    fn title(&self) -> &str;
}

impl Sortable for Task {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl Sortable for TaskDocument {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn title(&self) -> &str {
        &self.title
    }
}

/// Compares two items by `key` in direction `order`.
///
/// Titles compare case-insensitively first, with the raw text as a
/// tie-breaker so distinct titles never compare equal.
pub fn compare_by<T: Sortable + ?Sized>(a: &T, b: &T, key: SortKey, order: SortOrder) -> Ordering {
    let ascending = match key {
        SortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        SortKey::Title => a
            .title()
            .to_lowercase()
            .cmp(&b.title().to_lowercase())
            .then_with(|| a.title().cmp(b.title())),
    };
    match order {
        SortOrder::Asc => ascending,
        SortOrder::Desc => ascending.reverse(),
    }
}
