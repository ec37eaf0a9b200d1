//! Form validation for the login, register and task forms.
//!
//! A form that fails validation never reaches a holder. Each field reports at
//! most one error: "required" first, then format, then length bounds.

use taskdesk_proto::task::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, Task, TaskStatus};

use crate::notify::Notifier;
use crate::session::{LoginCredentials, RegisterCredentials};
use crate::tasks::{NewTask, TaskPatch};

/// Minimum password length on the login and register forms.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum display name length on the register form.
pub const MIN_NAME_LENGTH: usize = 2;

/// Minimum title length on the task form.
pub const MIN_TITLE_LENGTH: usize = 3;

/// Loose email shape check: `local@domain.tld` with no whitespace.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name (`"email"`, `"title"`, ...).
    pub field: &'static str,
    /// Message shown under the field.
    pub message: String,
}

/// A form did not pass validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Formulario incompleto")]
pub struct ValidationFailed {
    /// Every failed field, in form order.
    pub errors: Vec<FieldError>,
}

impl ValidationFailed {
    /// The error for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Emits the "incomplete form" warning.
    pub fn notify(&self, notifier: &Notifier) {
        notifier.warning(
            "Formulario incompleto",
            "Por favor completa todos los campos correctamente",
        );
    }
}

/// Accumulates field errors.
#[derive(Debug, Default)]
struct Checker {
    errors: Vec<FieldError>,
}

/// Constraints for one field.
#[derive(Debug, Clone, Copy, Default)]
struct Rules {
    required: bool,
    email: bool,
    min: Option<usize>,
    max: Option<usize>,
}

impl Checker {
    fn check(&mut self, field: &'static str, label: &str, value: &str, rules: Rules) {
        let len = value.chars().count();
        let message = if value.trim().is_empty() {
            rules.required.then(|| format!("{label} es requerido"))
        } else if rules.email && !is_plausible_email(value.trim()) {
            Some("Email inválido".to_string())
        } else if let Some(min) = rules.min.filter(|min| len < *min) {
            Some(format!("Mínimo {min} caracteres"))
        } else {
            rules
                .max
                .filter(|max| len > *max)
                .map(|max| format!("Máximo {max} caracteres"))
        };
        if let Some(message) = message {
            self.errors.push(FieldError { field, message });
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationFailed> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationFailed {
                errors: self.errors,
            })
        }
    }
}

const EMAIL: Rules = Rules {
    required: true,
    email: true,
    min: None,
    max: None,
};

const PASSWORD: Rules = Rules {
    required: true,
    email: false,
    min: Some(MIN_PASSWORD_LENGTH),
    max: None,
};

/// Email/password sign-in form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Email field.
    pub email: String,
    /// Password field.
    pub password: String,
}

impl LoginForm {
    /// Validates the form into credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationFailed`] listing every failed field.
    pub fn validate(&self) -> Result<LoginCredentials, ValidationFailed> {
        let mut checker = Checker::default();
        checker.check("email", "Email", &self.email, EMAIL);
        checker.check("password", "Contraseña", &self.password, PASSWORD);
        checker.finish(LoginCredentials::new(
            self.email.trim(),
            self.password.as_str(),
        ))
    }
}

/// Account registration form.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Display name field.
    pub name: String,
    /// Email field.
    pub email: String,
    /// Password field.
    pub password: String,
}

impl RegisterForm {
    /// Validates the form into credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationFailed`] listing every failed field.
    pub fn validate(&self) -> Result<RegisterCredentials, ValidationFailed> {
        let mut checker = Checker::default();
        checker.check(
            "name",
            "Nombre",
            &self.name,
            Rules {
                required: true,
                min: Some(MIN_NAME_LENGTH),
                ..Rules::default()
            },
        );
        checker.check("email", "Email", &self.email, EMAIL);
        checker.check("password", "Contraseña", &self.password, PASSWORD);
        checker.finish(
            RegisterCredentials::new(self.email.trim(), self.password.as_str())
                .with_name(self.name.trim()),
        )
    }
}

/// Create/edit task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Title field.
    pub title: String,
    /// Description field.
    pub description: String,
    /// Status selector; the create form starts on pending.
    pub status: Option<TaskStatus>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: Some(TaskStatus::Pending),
        }
    }
}

impl TaskForm {
    /// A form pre-filled from an existing task, as the edit page loads it.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(task.status),
        }
    }

    fn check(&self) -> Checker {
        let mut checker = Checker::default();
        checker.check(
            "title",
            "Título",
            &self.title,
            Rules {
                required: true,
                min: Some(MIN_TITLE_LENGTH),
                max: Some(MAX_TITLE_LENGTH),
                ..Rules::default()
            },
        );
        checker.check(
            "description",
            "Descripción",
            &self.description,
            Rules {
                max: Some(MAX_DESCRIPTION_LENGTH),
                ..Rules::default()
            },
        );
        if self.status.is_none() {
            checker.errors.push(FieldError {
                field: "status",
                message: "Estado es requerido".to_string(),
            });
        }
        checker
    }

    /// Validates the form into a create request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationFailed`] listing every failed field.
    pub fn validate(&self) -> Result<NewTask, ValidationFailed> {
        let mut task = NewTask::titled(self.title.trim()).with_description(self.description.trim());
        task.status = self.status;
        self.check().finish(task)
    }

    /// Validates the form and returns only the fields that differ from
    /// `original`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationFailed`] listing every failed field.
    pub fn changes_from(&self, original: &Task) -> Result<TaskPatch, ValidationFailed> {
        let title = self.title.trim();
        let description = self.description.trim();
        let patch = TaskPatch {
            title: (title != original.title).then(|| title.to_string()),
            description: (description != original.description).then(|| description.to_string()),
            status: self.status.filter(|status| *status != original.status),
        };
        self.check().finish(patch)
    }

    /// Returns `true` if any field differs from `original`.
    #[must_use]
    pub fn has_unsaved_changes(&self, original: &Task) -> bool {
        self.title.trim() != original.title
            || self.description.trim() != original.description
            || self.status != Some(original.status)
    }
}
