//! Task collection state: the holder, its error type, and list shaping.

pub mod holder;
pub mod shaping;

pub use holder::TaskHolder;
pub use shaping::{LocalFilter, StatusFilter};

use taskdesk_proto::task::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, TaskId, TaskStatus};

use crate::provider::ProviderError;

/// Which write a [`TaskError::WriteFailed`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

impl WriteOp {
    /// Message returned to the caller when this write fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Error al crear la tarea",
            Self::Update => "Error al actualizar la tarea",
            Self::Delete => "Error al eliminar la tarea",
        }
    }

    /// Toast title and description for a failed write.
    #[must_use]
    pub const fn failure_notice(self) -> (&'static str, &'static str) {
        match self {
            Self::Create => (
                "Error al crear tarea",
                "No se pudo crear la tarea. Intenta nuevamente.",
            ),
            Self::Update => (
                "Error al actualizar tarea",
                "No se pudo actualizar la tarea. Intenta nuevamente.",
            ),
            Self::Delete => (
                "Error al eliminar tarea",
                "No se pudo eliminar la tarea. Intenta nuevamente.",
            ),
        }
    }

    /// Toast title and description for a successful write on `title`.
    #[must_use]
    pub fn success_notice(self, title: &str) -> (&'static str, String) {
        match self {
            Self::Create => ("Tarea creada", format!("\"{title}\" ha sido creada exitosamente")),
            Self::Update => ("Tarea actualizada", format!("\"{title}\" ha sido actualizada")),
            Self::Delete => ("Tarea eliminada", format!("\"{title}\" ha sido eliminada")),
        }
    }
}

/// Errors that can occur in task collection operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// No user is signed in.
    #[error("Usuario no autenticado")]
    Unauthenticated,

    /// No task with this id exists.
    #[error("Tarea no encontrada")]
    NotFound(TaskId),

    /// The task belongs to another user.
    #[error("No tienes permiso para ver esta tarea")]
    Forbidden(TaskId),

    /// The document store could not be reached.
    #[error("Error de conexión")]
    Network,

    /// A read was rejected by the document store.
    #[error("Error al cargar las tareas")]
    QueryFailed {
        /// Provider code.
        code: String,
    },

    /// A write was rejected by the document store.
    #[error("{}", .op.failure_message())]
    WriteFailed {
        /// Which write failed.
        op: WriteOp,
        /// Provider code.
        code: String,
    },

    /// Title is empty after trimming.
    #[error("El título es requerido")]
    TitleEmpty,

    /// Title exceeds [`MAX_TITLE_LENGTH`] characters.
    #[error("El título no puede superar {} caracteres", MAX_TITLE_LENGTH)]
    TitleTooLong,

    /// Description exceeds [`MAX_DESCRIPTION_LENGTH`] characters.
    #[error("La descripción no puede superar {} caracteres", MAX_DESCRIPTION_LENGTH)]
    DescriptionTooLong,
}

impl TaskError {
    pub(crate) fn read(err: &ProviderError) -> Self {
        if err.is_network() {
            Self::Network
        } else {
            Self::QueryFailed {
                code: err.code.clone(),
            }
        }
    }

    pub(crate) fn write(op: WriteOp, err: &ProviderError) -> Self {
        if err.is_network() {
            Self::Network
        } else {
            Self::WriteFailed {
                op,
                code: err.code.clone(),
            }
        }
    }
}

/// Fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Title; trimmed before storing.
    pub title: String,
    /// Description; trimmed, empty when absent.
    pub description: Option<String>,
    /// Initial status, pending when absent.
    pub status: Option<TaskStatus>,
}

impl NewTask {
    /// A task with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub const fn status(status: TaskStatus) -> Self {
        Self {
            title: None,
            description: None,
            status: Some(status),
        }
    }

    /// A patch that only changes the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// A patch that only changes the description.
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Aggregate counts over the local list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    /// All tasks.
    pub total: usize,
    /// Pending tasks.
    pub pending: usize,
    /// In-progress tasks.
    pub in_progress: usize,
    /// Completed tasks.
    pub completed: usize,
}

/// Trims and bounds a title.
pub(crate) fn validate_title(title: &str) -> Result<String, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::TitleEmpty);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskError::TitleTooLong);
    }
    Ok(title.to_string())
}

/// Trims and bounds a description.
pub(crate) fn validate_description(description: &str) -> Result<String, TaskError> {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TaskError::DescriptionTooLong);
    }
    Ok(description.to_string())
}
