//! The signed-in user as the client sees it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when the provider has none for the account.
pub const DEFAULT_USER_NAME: &str = "Usuario";

/// Client-side role. Derived from an email allow-list on every rebuild of the
/// projection; it drives presentation only and grants nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Email is on the admin allow-list.
    Admin,
    /// Everyone else.
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Identity projection rebuilt from each provider auth notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-assigned opaque id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Account email, empty when the provider did not share one.
    pub email: String,
    /// Advisory role.
    pub role: UserRole,
    /// Always true for a projection built from a live session.
    pub is_active: bool,
    /// Account creation time as reported by the provider.
    pub created_at: DateTime<Utc>,
    /// Time the projection was built.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns `true` if the advisory role is [`UserRole::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Up to two uppercase initials taken from the display name, `"U"` when
    /// the name is blank.
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}
