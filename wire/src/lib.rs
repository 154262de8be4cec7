//! Identity-service wire types shared by `server` and `client`.
//!
//! This crate owns the JSON shapes exchanged with the identity backend
//! (`/auth/login`, `/auth/me`, `/auth/logout`, `/auth/check-session`,
//! `/auth/sessions`). The server proxies them verbatim and the browser client
//! decodes them, so both sides agree on one schema.

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /auth/logout` and `POST /auth/check-session`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBody {
    pub token: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Successful login response.
///
/// `access_token` defaults to empty so a body without it still decodes and
/// callers can report the missing token themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// The issued token exactly as sent, or `None` when it is blank.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        (!self.access_token.trim().is_empty()).then_some(self.access_token.as_str())
    }
}

/// Group reference embedded in the current-user response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

/// Response of `GET /auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub group: Option<GroupRef>,
}

/// Flattened profile kept in client state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub group_name: Option<String>,
}

impl From<CurrentUser> for UserProfile {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            group_name: user.group.map(|g| g.name),
        }
    }
}

/// Response of `POST /auth/check-session`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSessionResponse {
    pub valid: bool,
}

/// One server-tracked session as listed by `GET /auth/sessions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionItem {
    pub session_id: i64,
    pub token: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    /// ISO-8601 timestamp as emitted by the identity service.
    pub created_at: String,
    pub last_accessed: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body returned by the identity service: `{"detail": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}

impl ErrorBody {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: Value::String(detail.into()) }
    }
}

/// Extract the human-readable `detail` string from an error body.
///
/// Only string details count; validation error lists and non-JSON bodies
/// yield `None`.
#[must_use]
pub fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

/// User-visible message for a failed call: the service's detail, or a
/// generic status line.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    error_detail(body).unwrap_or_else(|| format!("request failed: {status}"))
}
