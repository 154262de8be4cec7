//! Identity API transport.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net` against the server's
//! `/api/auth/*` proxy. Native/SSR builds: `HttpIdentityApi` returns
//! `ApiError::Network` since these endpoints are only meaningful in the
//! browser.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. The auth context decides which
//! failures become user-visible and which degrade to an anonymous session.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use wire::{CurrentUser, SessionItem, TokenResponse};

/// Base path of the server's auth proxy.
pub const DEFAULT_API_BASE: &str = "/api";

/// Transport-level failure talking to the identity API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the service rejected the caller's credentials.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status: 400 | 401 | 403, .. })
    }
}

/// Calls the auth context makes against the identity service.
#[async_trait(?Send)]
pub trait IdentityApi: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError>;

    /// `GET /auth/me` with the token as bearer credential.
    async fn current_user(&self, token: &str) -> Result<CurrentUser, ApiError>;

    /// `POST /auth/logout` with the token as bearer credential and body.
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// `GET /auth/sessions`.
    async fn list_sessions(&self, token: &str) -> Result<Vec<SessionItem>, ApiError>;

    /// `DELETE /auth/sessions/{id}`.
    async fn revoke_session(&self, token: &str, session_id: i64) -> Result<(), ApiError>;
}

#[cfg(any(test, feature = "hydrate"))]
fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

#[cfg(any(test, feature = "hydrate"))]
fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(any(test, feature = "hydrate"))]
fn session_endpoint(base: &str, session_id: i64) -> String {
    endpoint(base, &format!("/auth/sessions/{session_id}"))
}

// =============================================================================
// FETCH IMPLEMENTATION
// =============================================================================

/// `fetch`-backed identity API rooted at `base` (normally [`DEFAULT_API_BASE`]).
#[derive(Clone, Debug)]
pub struct HttpIdentityApi {
    base: String,
}

impl HttpIdentityApi {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Base path requests are rooted at.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Default for HttpIdentityApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[cfg(feature = "hydrate")]
fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

#[cfg(feature = "hydrate")]
async fn expect_ok(resp: gloo_net::http::Response) -> Result<gloo_net::http::Response, ApiError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status, message: wire::error_message(status, &body) })
}

#[cfg(feature = "hydrate")]
async fn decode<T: serde::de::DeserializeOwned>(resp: gloo_net::http::Response) -> Result<T, ApiError> {
    let resp = expect_ok(resp).await?;
    resp.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(not(feature = "hydrate"))]
fn unavailable() -> ApiError {
    ApiError::Network("not available on server".to_owned())
}

#[async_trait(?Send)]
impl IdentityApi for HttpIdentityApi {
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let payload = wire::LoginRequest { username: username.to_owned(), password: password.to_owned() };
            let resp = gloo_net::http::Request::post(&endpoint(&self.base, "/auth/login"))
                .json(&payload)
                .map_err(network)?
                .send()
                .await
                .map_err(network)?;
            decode(resp).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (username, password);
            Err(unavailable())
        }
    }

    async fn current_user(&self, token: &str) -> Result<CurrentUser, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::get(&endpoint(&self.base, "/auth/me"))
                .header("Authorization", &bearer(token))
                .send()
                .await
                .map_err(network)?;
            decode(resp).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = token;
            Err(unavailable())
        }
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let payload = wire::TokenBody { token: token.to_owned() };
            let resp = gloo_net::http::Request::post(&endpoint(&self.base, "/auth/logout"))
                .header("Authorization", &bearer(token))
                .json(&payload)
                .map_err(network)?
                .send()
                .await
                .map_err(network)?;
            expect_ok(resp).await.map(|_| ())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = token;
            Err(unavailable())
        }
    }

    async fn list_sessions(&self, token: &str) -> Result<Vec<SessionItem>, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::get(&endpoint(&self.base, "/auth/sessions"))
                .header("Authorization", &bearer(token))
                .send()
                .await
                .map_err(network)?;
            decode(resp).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = token;
            Err(unavailable())
        }
    }

    async fn revoke_session(&self, token: &str, session_id: i64) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::delete(&session_endpoint(&self.base, session_id))
                .header("Authorization", &bearer(token))
                .send()
                .await
                .map_err(network)?;
            expect_ok(resp).await.map(|_| ())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (token, session_id);
            Err(unavailable())
        }
    }
}
