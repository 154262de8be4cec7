//! Identity service client for login, current user, logout, and session checks.
//!
//! Thin HTTP wrapper over the external identity backend. Handlers and the
//! edge guard depend on the `IdentityService` trait so tests can swap in a
//! mock; `HttpIdentityService` is the `reqwest` implementation.

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use wire::{CheckSessionResponse, CurrentUser, LoginRequest, SessionItem, TokenBody, TokenResponse};

use crate::config::IdentityTimeouts;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The request never produced a response.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The identity service answered with a non-success status.
    #[error("identity service rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The response body did not match the expected shape.
    #[error("identity response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// `POST /auth/login`. `user_agent` is forwarded so the backend can label
    /// the session with the browser rather than this proxy.
    async fn login(&self, request: &LoginRequest, user_agent: Option<&str>) -> Result<TokenResponse, IdentityError>;

    /// `GET /auth/me`.
    async fn current_user(&self, token: &str) -> Result<CurrentUser, IdentityError>;

    /// `POST /auth/logout`.
    async fn logout(&self, token: &str) -> Result<(), IdentityError>;

    /// `POST /auth/check-session`; `Ok(false)` for a token the backend no
    /// longer knows.
    async fn check_session(&self, token: &str) -> Result<bool, IdentityError>;

    /// `GET /auth/sessions`.
    async fn list_sessions(&self, token: &str) -> Result<Vec<SessionItem>, IdentityError>;

    /// `DELETE /auth/sessions/{id}`.
    async fn revoke_session(&self, token: &str, session_id: i64) -> Result<(), IdentityError>;

    /// `POST /auth/logout-all`.
    async fn logout_all(&self, token: &str) -> Result<(), IdentityError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpIdentityService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityService {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: IdentityTimeouts) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, IdentityError> {
        let response = request.send().await.map_err(|e| IdentityError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(IdentityError::Rejected { status, detail: wire::error_message(status, &text) });
        }
        Ok(text)
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Decode a success body.
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, IdentityError> {
    serde_json::from_str(text).map_err(|e| IdentityError::Parse(e.to_string()))
}

#[async_trait::async_trait]
impl IdentityService for HttpIdentityService {
    async fn login(&self, request: &LoginRequest, user_agent: Option<&str>) -> Result<TokenResponse, IdentityError> {
        let mut builder = self.http.post(self.url("/auth/login")).json(request);
        if let Some(agent) = user_agent {
            builder = builder.header(USER_AGENT, agent);
        }
        let text = self.send(builder).await?;
        parse_body(&text)
    }

    async fn current_user(&self, token: &str) -> Result<CurrentUser, IdentityError> {
        let builder = self.http.get(self.url("/auth/me")).header(AUTHORIZATION, bearer(token));
        let text = self.send(builder).await?;
        parse_body(&text)
    }

    async fn logout(&self, token: &str) -> Result<(), IdentityError> {
        let builder = self
            .http
            .post(self.url("/auth/logout"))
            .header(AUTHORIZATION, bearer(token))
            .json(&TokenBody { token: token.to_owned() });
        self.send(builder).await.map(|_| ())
    }

    async fn check_session(&self, token: &str) -> Result<bool, IdentityError> {
        let builder = self
            .http
            .post(self.url("/auth/check-session"))
            .json(&TokenBody { token: token.to_owned() });
        let text = self.send(builder).await?;
        parse_body::<CheckSessionResponse>(&text).map(|r| r.valid)
    }

    async fn list_sessions(&self, token: &str) -> Result<Vec<SessionItem>, IdentityError> {
        let builder = self.http.get(self.url("/auth/sessions")).header(AUTHORIZATION, bearer(token));
        let text = self.send(builder).await?;
        parse_body(&text)
    }

    async fn revoke_session(&self, token: &str, session_id: i64) -> Result<(), IdentityError> {
        let builder = self
            .http
            .delete(self.url(&format!("/auth/sessions/{session_id}")))
            .header(AUTHORIZATION, bearer(token));
        self.send(builder).await.map(|_| ())
    }

    async fn logout_all(&self, token: &str) -> Result<(), IdentityError> {
        let builder = self.http.post(self.url("/auth/logout-all")).header(AUTHORIZATION, bearer(token));
        self.send(builder).await.map(|_| ())
    }
}
