//! Request/response stages shared by every backend call.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, StatusCode};

use super::GatewayError;
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;

/// Whether a response status means the presented token was rejected.
pub fn is_authorization_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}

/// Attaches the session token on the way out and reacts to rejected
/// credentials on the way back.
pub struct AuthInterceptor {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Outbound stage: injects `Authorization: Bearer <token>` unless the
    /// caller already set an authorization header.
    pub fn before_send(&self, request: &mut Request) -> Result<(), GatewayError> {
        if request.headers().contains_key(AUTHORIZATION) {
            return Ok(());
        }

        // An unreadable store counts as signed out, matching the route guard.
        let token = match self.store.token() {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!("session store unreadable, sending without credentials: {e:#}");
                return Ok(());
            }
        };

        let mut value = bearer_header(&token)?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Inbound stage: on an authorization failure clears the session and
    /// sends the user to sign-in, then reports `AuthFailure`.
    pub fn after_response(&self, status: StatusCode) -> Result<(), GatewayError> {
        if !is_authorization_failure(status) {
            return Ok(());
        }

        self.handle_authorization_failure();
        Err(GatewayError::AuthFailure {
            status: status.as_u16(),
        })
    }

    /// Returns whether this call performed the redirect.
    fn handle_authorization_failure(&self) -> bool {
        match self.store.clear_session() {
            Ok(true) => {
                tracing::warn!("backend rejected credentials; session cleared");
                self.navigator.navigate(Route::SignIn);
                true
            }
            // Someone else already cleared the session and redirected.
            Ok(false) => {
                tracing::debug!("authorization failure with no session left");
                false
            }
            Err(e) => {
                tracing::warn!("failed to clear session after authorization failure: {e:#}");
                self.navigator.navigate(Route::SignIn);
                true
            }
        }
    }
}

pub(crate) fn bearer_header(token: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
        GatewayError::Session(anyhow::anyhow!(
            "stored token is not a valid header value: {e}"
        ))
    })
}
