//! Terminal stand-in for page navigation.

use std::fmt;
use std::sync::Mutex;

use campus_core::guard::Denial;
use campus_core::navigation::{Navigator, Route};

/// Prints the screen a redirect lands on and remembers the last one.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    last: Mutex<Option<Route>>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_redirect(&self) -> Option<Route> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(route);

        match route {
            Route::SignIn => {
                eprintln!("→ {route}  Sign in with `campus-admin login --email <EMAIL>`.");
            }
            Route::Unauthorized => {
                eprintln!("→ {route}  This account does not have admin privileges.");
            }
            _ => {}
        }
    }
}

/// A command ended on a redirect instead of its own output.
#[derive(Debug)]
pub struct Redirected {
    pub route: Route,
    pub reason: String,
}

impl Redirected {
    pub fn new(route: Route, reason: impl Into<String>) -> Self {
        Self {
            route,
            reason: reason.into(),
        }
    }

    /// The session was rejected mid-command.
    pub fn session_expired() -> Self {
        Self::new(Route::SignIn, "Session expired or revoked")
    }
}

impl From<Denial> for Redirected {
    fn from(denial: Denial) -> Self {
        Self::new(denial.redirect_target(), denial.message())
    }
}

impl fmt::Display for Redirected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (redirected to {})", self.reason, self.route)
    }
}

impl std::error::Error for Redirected {}
