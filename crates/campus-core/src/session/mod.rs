//! Session storage.
//!
//! A session is the token handed out by sign-in plus the cached admin flag.
//! Stores persist both values together: a reader sees either the whole
//! session or nothing.

mod file;

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;

pub use file::FileSessionStore;

/// Client-held proof of authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub is_admin: bool,
}

impl Session {
    pub fn new(token: impl Into<String>, is_admin: bool) -> Self {
        Self {
            token: token.into(),
            is_admin,
        }
    }
}

/// Holder of the current session.
///
/// Implementations must make `set_session` and `clear_session` atomic with
/// respect to `load`.
pub trait SessionStore: Send + Sync {
    /// Returns the current session, if any.
    fn load(&self) -> Result<Option<Session>>;

    /// Replaces the current session.
    fn set_session(&self, token: &str, is_admin: bool) -> Result<()>;

    /// Removes the current session.
    ///
    /// Returns `true` only for the call that actually removed one, so
    /// concurrent callers can tell who performed the transition.
    fn clear_session(&self) -> Result<bool>;

    fn token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|s| s.token))
    }

    /// False when there is no session.
    fn is_admin(&self) -> Result<bool> {
        Ok(self.load()?.is_some_and(|s| s.is_admin))
    }
}

/// Shortens a token for logs and terminal output.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if prefix.len() < token.len() {
        format!("{prefix}…")
    } else {
        "…".to_string()
    }
}

fn ensure_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Session token must not be empty");
    }
    Ok(())
}

/// In-process store, for tests and hosts without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    current: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(token: &str, is_admin: bool) -> Self {
        Self {
            current: Mutex::new(Some(Session::new(token, is_admin))),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot().clone())
    }

    fn set_session(&self, token: &str, is_admin: bool) -> Result<()> {
        ensure_token(token)?;
        *self.slot() = Some(Session::new(token, is_admin));
        Ok(())
    }

    fn clear_session(&self) -> Result<bool> {
        Ok(self.slot().take().is_some())
    }
}
