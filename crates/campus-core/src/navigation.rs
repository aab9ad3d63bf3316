//! Navigation targets and the redirect side effect.

use std::fmt;
use std::sync::Mutex;

/// Well-known destinations of the backoffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    Unauthorized,
    Root,
    Statistics,
    UserManagement,
    BlockUser,
    AuthorizeAdmin,
    Courses,
    GeneralStatistics,
    CourseStatistics,
    AssignmentStatistics,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/signin",
            Route::Unauthorized => "/unauthorized",
            Route::Root => "/",
            Route::Statistics => "/statistics",
            Route::UserManagement => "/user-management",
            Route::BlockUser => "/block-user",
            Route::AuthorizeAdmin => "/authorize-admin",
            Route::Courses => "/courses",
            Route::GeneralStatistics => "/statistics/general",
            Route::CourseStatistics => "/statistics/courses",
            Route::AssignmentStatistics => "/statistics/assignments",
        }
    }

    /// Public routes are reachable without a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::SignIn | Route::Unauthorized)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs a navigation on behalf of the guard or the gateway.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every navigation so far, oldest first.
    pub fn visits(&self) -> Vec<Route> {
        self.visits
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn last(&self) -> Option<Route> {
        self.visits().last().copied()
    }

    pub fn count(&self, route: Route) -> usize {
        self.visits().iter().filter(|r| **r == route).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "navigate");
        match self.visits.lock() {
            Ok(mut v) => v.push(route),
            Err(poisoned) => poisoned.into_inner().push(route),
        }
    }
}
