//! Auth routes: identity-service proxy and session cookie management.
//!
//! The browser client talks to these endpoints instead of the identity
//! service directly. Login sets the HttpOnly session cookie the edge guard
//! checks; everything else forwards the bearer token and passes upstream
//! errors through as `{"detail": ...}`.

use axum::extract::{FromRef, Path, State};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use wire::{ErrorBody, LoginRequest};

use crate::config::{Config, SECURE_COOKIE_PREFIX};
use crate::services::identity::IdentityError;
use crate::state::AppState;

// =============================================================================
// COOKIES
// =============================================================================

fn base_cookie(name: String, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub(crate) fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    base_cookie(config.session_cookie.clone(), token, config.cookie_secure)
}

/// Expire every name the session cookie may live under. Browsers ignore a
/// `__Secure-` cookie set without `Secure`, so that name always carries it.
pub(crate) fn clear_session_cookies(jar: CookieJar, config: &Config) -> CookieJar {
    config.session_cookie_names().into_iter().fold(jar, |jar, name| {
        let secure = config.cookie_secure || name.starts_with(SECURE_COOKIE_PREFIX);
        let mut cookie = base_cookie(name, String::new(), secure);
        cookie.set_max_age(Duration::ZERO);
        jar.add(cookie)
    })
}

/// Session token from the cookie jar, if any.
pub(crate) fn session_token(jar: &CookieJar, config: &Config) -> Option<String> {
    config
        .session_cookie_names()
        .iter()
        .filter_map(|name| jar.get(name))
        .map(|c| c.value().trim())
        .find(|v| !v.is_empty())
        .map(str::to_owned)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

/// Token from `Authorization: Bearer`, falling back to the session cookie.
pub(crate) fn request_token(headers: &HeaderMap, jar: &CookieJar, config: &Config) -> Option<String> {
    bearer_token(headers).or_else(|| session_token(jar, config))
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Bearer token for the current request. Use as a handler parameter to
/// require a credential.
pub struct BearerToken(pub String);

impl<S> axum::extract::FromRequestParts<S> for BearerToken
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        request_token(&parts.headers, &jar, &app_state.config)
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Map an identity failure onto the proxy response.
pub(crate) fn identity_error_response(err: IdentityError) -> Response {
    match err {
        IdentityError::Rejected { status, detail } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(ErrorBody::new(detail))).into_response()
        }
        other => {
            tracing::warn!(error = %other, "identity service unavailable");
            (StatusCode::BAD_GATEWAY, Json(ErrorBody::new("identity service unavailable"))).into_response()
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: proxy login, set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response {
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let resp = match state.identity.login(&request, user_agent).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::info!(username = %request.username, error = %e, "login failed");
            return identity_error_response(e);
        }
    };

    let Some(token) = resp.token().map(str::to_owned) else {
        tracing::warn!(username = %request.username, "login response missing access token");
        return (StatusCode::BAD_GATEWAY, Json(ErrorBody::new("login response did not include an access token")))
            .into_response();
    };

    tracing::info!(username = %request.username, "login succeeded");
    let jar = jar.add(session_cookie(&state.config, token));
    (jar, Json(resp)).into_response()
}

/// `POST /api/auth/logout`: best-effort remote logout; the cookie is
/// always cleared.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Response {
    if let Some(token) = request_token(&headers, &jar, &state.config) {
        if let Err(e) = state.identity.logout(&token).await {
            tracing::warn!(error = %e, "remote logout failed; clearing cookie anyway");
        }
    }
    (clear_session_cookies(jar, &state.config), StatusCode::NO_CONTENT).into_response()
}

/// `POST /api/auth/logout-all`: end every session of the current user.
pub async fn logout_all(State(state): State<AppState>, jar: CookieJar, BearerToken(token): BearerToken) -> Response {
    match state.identity.logout_all(&token).await {
        Ok(()) => (clear_session_cookies(jar, &state.config), StatusCode::NO_CONTENT).into_response(),
        Err(e) => identity_error_response(e),
    }
}

/// `GET /api/auth/me`: current user.
pub async fn me(State(state): State<AppState>, BearerToken(token): BearerToken) -> Response {
    match state.identity.current_user(&token).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => identity_error_response(e),
    }
}

/// `GET /api/auth/sessions`: sessions of the current user.
pub async fn list_sessions(State(state): State<AppState>, BearerToken(token): BearerToken) -> Response {
    match state.identity.list_sessions(&token).await {
        Ok(sessions) => Json(sessions).into_response(),
        Err(e) => identity_error_response(e),
    }
}

/// `DELETE /api/auth/sessions/{id}`: revoke one session.
pub async fn revoke_session(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(session_id): Path<i64>,
) -> Response {
    match state.identity.revoke_session(&token, session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => identity_error_response(e),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
