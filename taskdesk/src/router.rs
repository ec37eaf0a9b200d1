//! Route table and navigation.
//!
//! Two guarded subtrees: `/auth/*` (login, register) for signed-out
//! visitors and the task pages for signed-in users. Anything else redirects
//! to the login page.

use std::sync::Arc;

use parking_lot::RwLock;

use taskdesk_proto::task::TaskId;

use crate::guards::{GuardDecision, GuardKind, LOGIN_PATH};
use crate::provider::IdentityProvider;

/// Redirect hops followed before navigation gives up.
pub const MAX_REDIRECTS: usize = 8;

/// A renderable page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/auth/login`
    Login,
    /// `/auth/register`
    Register,
    /// `/`
    TaskList,
    /// `/create`
    CreateTask,
    /// `/edit/:taskId`
    EditTask(TaskId),
}

impl Route {
    /// Canonical path of this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_string(),
            Self::Register => "/auth/register".to_string(),
            Self::TaskList => "/".to_string(),
            Self::CreateTask => "/create".to_string(),
            Self::EditTask(id) => format!("/edit/{id}"),
        }
    }

    /// Guard of the subtree this route belongs to.
    #[must_use]
    pub const fn guard(&self) -> GuardKind {
        match self {
            Self::Login | Self::Register => GuardKind::Unauthenticated,
            Self::TaskList | Self::CreateTask | Self::EditTask(_) => GuardKind::Authenticated,
        }
    }

    /// Returns `true` for pages that need a signed-in user.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self.guard(), GuardKind::Authenticated)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Static path match, before any guard runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// The path names a route.
    Route(Route),
    /// The path is a configured redirect.
    Redirect(&'static str),
}

/// Matches `path` against the route table. Query strings, fragments and a
/// trailing slash are ignored.
#[must_use]
pub fn match_path(path: &str) -> PathMatch {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => PathMatch::Route(Route::TaskList),
        ["create"] => PathMatch::Route(Route::CreateTask),
        ["edit", id] => PathMatch::Route(Route::EditTask(TaskId::new(*id))),
        ["auth", "login"] => PathMatch::Route(Route::Login),
        ["auth", "register"] => PathMatch::Route(Route::Register),
        _ => PathMatch::Redirect(LOGIN_PATH),
    }
}

/// Result of resolving one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Render this route.
    Render(Route),
    /// Go to this path instead.
    Redirect(String),
}

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The route that rendered.
    pub route: Route,
    /// Paths redirected through, in order.
    pub redirects: Vec<String>,
}

/// Errors that can occur while navigating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// Redirects did not settle on a route.
    #[error("redirect loop navigating to {path} ({hops} hops)")]
    RedirectLoop {
        /// Path originally requested.
        path: String,
        /// Hops followed.
        hops: usize,
    },
}

/// Resolves paths through the route table and the guards.
#[derive(Debug)]
pub struct Router<I> {
    provider: Arc<I>,
    current: RwLock<Option<Route>>,
}

impl<I: IdentityProvider> Router<I> {
    /// A router whose guards consult `provider`.
    pub fn new(provider: Arc<I>) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
        }
    }

    /// Matches `path` and runs the subtree guard once.
    pub async fn resolve(&self, path: &str) -> Resolution {
        match match_path(path) {
            PathMatch::Redirect(to) => Resolution::Redirect(to.to_string()),
            PathMatch::Route(route) => match route.guard().check(&*self.provider).await {
                GuardDecision::Permit => Resolution::Render(route),
                GuardDecision::Redirect(to) => Resolution::Redirect(to.to_string()),
            },
        }
    }

    /// Resolves `path`, following redirects, and records the rendered route
    /// as current.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RedirectLoop`] after [`MAX_REDIRECTS`] hops.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, RouterError> {
        let mut target = path.to_string();
        let mut redirects = Vec::new();
        loop {
            match self.resolve(&target).await {
                Resolution::Render(route) => {
                    tracing::debug!(requested = path, route = %route, hops = redirects.len(), "router: rendered");
                    *self.current.write() = Some(route.clone());
                    return Ok(Navigation { route, redirects });
                }
                Resolution::Redirect(next) => {
                    if redirects.len() >= MAX_REDIRECTS {
                        tracing::warn!(requested = path, "router: redirect loop");
                        return Err(RouterError::RedirectLoop {
                            path: path.to_string(),
                            hops: redirects.len(),
                        });
                    }
                    redirects.push(next.clone());
                    target = next;
                }
            }
        }
    }

    /// The route last rendered.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.current.read().clone()
    }
}
