//! Route guards.
//!
//! A guard waits for one fresh auth-state notification from the identity
//! provider, then permits or redirects. It never reads a cached session
//! value, so a route entered while the provider is still restoring a session
//! waits for the provider to settle.

use crate::provider::{AuthEvent, IdentityProvider};

/// Where the authenticated-only guard sends signed-out visitors.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where the unauthenticated-only guard sends signed-in visitors.
pub const ROOT_PATH: &str = "/";

/// The two guard kinds, one per route subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// Admits only when a user is signed in.
    Authenticated,
    /// Admits only when no user is signed in.
    Unauthenticated,
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Enter the route.
    Permit,
    /// Deny and go here instead.
    Redirect(&'static str),
}

impl GuardDecision {
    /// Returns `true` for [`GuardDecision::Permit`].
    #[must_use]
    pub const fn is_permit(self) -> bool {
        matches!(self, Self::Permit)
    }
}

impl GuardKind {
    /// The decision for a session snapshot.
    #[must_use]
    pub const fn decide(self, signed_in: bool) -> GuardDecision {
        match (self, signed_in) {
            (Self::Authenticated, true) | (Self::Unauthenticated, false) => GuardDecision::Permit,
            (Self::Authenticated, false) => GuardDecision::Redirect(LOGIN_PATH),
            (Self::Unauthenticated, true) => GuardDecision::Redirect(ROOT_PATH),
        }
    }

    /// Waits for the provider's next settled auth state and decides.
    ///
    /// A closed auth stream counts as signed out.
    pub async fn check<I: IdentityProvider>(self, provider: &I) -> GuardDecision {
        let mut subscription = provider.subscribe();
        let signed_in = matches!(subscription.next().await, Some(AuthEvent::SignedIn(_)));
        let decision = self.decide(signed_in);
        tracing::debug!(guard = ?self, signed_in, ?decision, "guard evaluated");
        decision
    }
}
