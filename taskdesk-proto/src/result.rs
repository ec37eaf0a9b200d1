//! Uniform result envelopes reported to callers.
//!
//! Holders return typed `Result`s internally; these envelopes are the
//! serializable `{success, data?, error?}` shape a page or the terminal
//! front-end renders.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Outcome of a holder operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Translated error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> OperationResult<T> {
    /// A successful outcome carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed outcome carrying `message`.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for OperationResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Outcome of a session operation; the payload is named `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The signed-in user on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Translated error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<E: std::fmt::Display> From<Result<User, E>> for AuthResult {
    fn from(result: Result<User, E>) -> Self {
        match result {
            Ok(user) => Self {
                success: true,
                user: Some(user),
                error: None,
            },
            Err(e) => Self {
                success: false,
                user: None,
                error: Some(e.to_string()),
            },
        }
    }
}
