//! Sign-in and sign-out.

use serde::{Deserialize, Serialize};

use crate::gateway::{Gateway, GatewayError, GatewayResult};
use crate::navigation::Route;
use crate::session::redact_token;

const SIGN_IN_PATH: &str = "/login/email";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// User returned by sign-in. Only the token and admin flag outlive the call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl AuthenticatedUser {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    id_token: String,
    user_info: AuthenticatedUser,
}

#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub user: AuthenticatedUser,
    /// Where the user was sent after the session was stored.
    pub landing: Route,
}

/// Exchanges credentials for a session.
///
/// Stores the token and admin flag, then navigates to the application root
/// for admins or to the unauthorized page otherwise.
pub async fn sign_in(
    gateway: &Gateway,
    email: &str,
    password: &str,
) -> GatewayResult<SignInOutcome> {
    let response: LoginResponse = gateway
        .post_json(SIGN_IN_PATH, &LoginRequest { email, password })
        .await?;

    gateway
        .store()
        .set_session(&response.id_token, response.user_info.is_admin)
        .map_err(GatewayError::Session)?;
    tracing::info!(
        uid = %response.user_info.uid,
        token = %redact_token(&response.id_token),
        is_admin = response.user_info.is_admin,
        "signed in"
    );

    let landing = if response.user_info.is_admin {
        Route::Root
    } else {
        Route::Unauthorized
    };
    gateway.navigator().navigate(landing);

    Ok(SignInOutcome {
        user: response.user_info,
        landing,
    })
}

/// Operator-facing message for a failed sign-in.
pub fn sign_in_failure_message(err: &GatewayError) -> String {
    match err {
        GatewayError::AuthFailure { .. } => "Invalid email or password".to_string(),
        GatewayError::Status { status: 403, .. } => {
            "Access denied. Admin privileges required.".to_string()
        }
        GatewayError::Status { status, .. } => format!("Server error: {status}"),
        GatewayError::Transport(_) => {
            "No response from server. Please check your connection.".to_string()
        }
        _ => "Unexpected error occurred.".to_string(),
    }
}

/// Ends the session and returns to the sign-in page.
///
/// Returns whether there was a session to end.
pub fn sign_out(gateway: &Gateway) -> anyhow::Result<bool> {
    let cleared = gateway.store().clear_session()?;
    gateway.navigator().navigate(Route::SignIn);
    Ok(cleared)
}
