//! Route guard: decides whether a protected view may be shown.
//!
//! Each mount runs the transition once:
//!
//! ```text
//! Validating ──no token──────────────▶ Denied(NoSession)             → /signin
//!            ──token, not admin──────▶ Denied(InsufficientPrivilege) → /unauthorized
//!            ──remote check rejects──▶ Denied(SessionInvalid)        → clear, /signin
//!            ──otherwise─────────────▶ Allowed
//! ```
//!
//! The remote check only runs when a [`TokenValidator`] is installed. While it
//! is outstanding the guard stays in `Validating`, and the protected view is
//! not invoked until the state is `Allowed`.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::gateway::Gateway;
use crate::navigation::{Navigator, Route};
use crate::session::{Session, SessionStore};

/// Why the guard refused a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NoSession,
    InsufficientPrivilege,
    SessionInvalid,
}

impl Denial {
    pub fn redirect_target(self) -> Route {
        match self {
            Denial::NoSession | Denial::SessionInvalid => Route::SignIn,
            Denial::InsufficientPrivilege => Route::Unauthorized,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Denial::NoSession => "Not signed in",
            Denial::InsufficientPrivilege => "Access denied: admin privileges required",
            Denial::SessionInvalid => "Session is no longer valid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Validating,
    Allowed,
    Denied(Denial),
}

/// Remote confirmation that a token is still accepted.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> anyhow::Result<bool>;
}

/// Validates by calling a backend endpoint with the token; any 2xx is valid.
pub struct RemoteTokenValidator {
    gateway: Arc<Gateway>,
    path: String,
}

impl RemoteTokenValidator {
    pub fn new(gateway: Arc<Gateway>, path: impl Into<String>) -> Self {
        Self {
            gateway,
            path: path.into(),
        }
    }
}

#[async_trait]
impl TokenValidator for RemoteTokenValidator {
    async fn validate(&self, token: &str) -> anyhow::Result<bool> {
        let status = self.gateway.probe(&self.path, token).await?;
        tracing::debug!(status = status.as_u16(), path = %self.path, "token validation");
        Ok(status.is_success())
    }
}

type StateObserver = Box<dyn Fn(GuardState) + Send + Sync>;

pub struct RouteGuard {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    validator: Option<Arc<dyn TokenValidator>>,
    observer: Option<StateObserver>,
}

impl RouteGuard {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            validator: None,
            observer: None,
        }
    }

    /// Enables the remote check after the local checks pass.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn TokenValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Called with every state the guard enters, e.g. to show a spinner
    /// while `Validating`.
    #[must_use]
    pub fn on_state(mut self, observer: impl Fn(GuardState) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Steps 1-3: the checks answered from the session store alone.
    ///
    /// A store that cannot be read counts as no session.
    pub fn check_local(&self) -> Result<Session, Denial> {
        let session = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => return Err(Denial::NoSession),
            Err(e) => {
                tracing::warn!("session store unreadable, treating as signed out: {e:#}");
                return Err(Denial::NoSession);
            }
        };

        if !session.is_admin {
            return Err(Denial::InsufficientPrivilege);
        }
        Ok(session)
    }

    /// Runs the transition once and performs the redirect on denial.
    ///
    /// Never returns `Validating`.
    pub async fn mount(&self) -> GuardState {
        self.report(GuardState::Validating);

        let state = match self.decide().await {
            Ok(()) => GuardState::Allowed,
            Err(denial) => {
                if denial == Denial::SessionInvalid
                    && let Err(e) = self.store.clear_session()
                {
                    tracing::warn!("failed to clear rejected session: {e:#}");
                }
                tracing::info!(
                    reason = ?denial,
                    target = %denial.redirect_target(),
                    "guard denied navigation"
                );
                self.navigator.navigate(denial.redirect_target());
                GuardState::Denied(denial)
            }
        };

        self.report(state);
        state
    }

    /// Mounts the guard and runs `view` only if access is allowed.
    pub async fn render<F, Fut, T>(&self, view: F) -> Result<T, Denial>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.mount().await {
            GuardState::Allowed => Ok(view().await),
            GuardState::Denied(denial) => Err(denial),
            // mount() always settles
            GuardState::Validating => Err(Denial::NoSession),
        }
    }

    async fn decide(&self) -> Result<(), Denial> {
        let session = self.check_local()?;

        let Some(validator) = &self.validator else {
            return Ok(());
        };

        match validator.validate(&session.token).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Denial::SessionInvalid),
            Err(e) => {
                tracing::warn!("token validation failed: {e:#}");
                Err(Denial::SessionInvalid)
            }
        }
    }

    fn report(&self, state: GuardState) {
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }
}
