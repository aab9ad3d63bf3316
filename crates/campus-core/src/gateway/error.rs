use serde_json::Value;
use thiserror::Error;

/// Failure surfaced by a backend call.
///
/// `AuthFailure` is reported after the gateway has already cleared the
/// session and redirected; every other variant is left to the caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authorization failed (HTTP {status}); please sign in again")]
    AuthFailure { status: u16 },

    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint path '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("session store: {0:#}")]
    Session(anyhow::Error),
}

impl GatewayError {
    /// Builds a status error, pulling a readable message out of JSON bodies.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match extract_message(body) {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self::Status {
            status,
            message,
            body: body.to_string(),
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthFailure { status } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure { .. })
    }

    /// Message the backend put in the error body, if any.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Status { body, .. } => extract_message(body),
            _ => None,
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let candidate = json
        .get("message")
        .or_else(|| json.get("detail"))
        .or_else(|| json.get("error").and_then(|e| e.get("message")))
        .or_else(|| json.get("error"))?;
    candidate
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
