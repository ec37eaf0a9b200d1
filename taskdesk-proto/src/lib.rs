//! Shared data model for `TaskDesk`.
//!
//! Everything that crosses the backend boundary lives here: the user
//! projection, the task record and its stored document shape, list query
//! parameters, the provider error-code table, and the result envelope that
//! every holder operation is reported through.

pub mod codes;
pub mod query;
pub mod result;
pub mod task;
pub mod user;

/// A string did not name a known variant of one of the model enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enum was being parsed (`"status"`, `"sort key"`, ...).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
