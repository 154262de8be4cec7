//! Edge guard: session check in front of protected pages.
//!
//! DESIGN
//! ======
//! Per request to a protected prefix:
//! - no session cookie: redirect to the login page, no backend call;
//! - cookie present but `check-session` says invalid, or the check itself
//!   fails: clear the session cookies and redirect (fail closed);
//! - cookie present and valid: run the inner service.
//!
//! Every navigation re-validates. There is no cache across requests.

#[cfg(test)]
#[path = "edge_guard_test.rs"]
mod tests;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::config::Config;
use crate::routes::auth::{clear_session_cookies, session_token};
use crate::state::AppState;

/// Login page unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

pub async fn edge_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    if !state.config.is_protected(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = session_token(&jar, &state.config) else {
        tracing::debug!(path = %request.uri().path(), "no session cookie; redirecting to login");
        return Redirect::temporary(LOGIN_PATH).into_response();
    };

    match state.identity.check_session(&token).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::debug!(path = %request.uri().path(), "session rejected; clearing cookie");
            deny(jar, &state.config)
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "session check failed; denying");
            deny(jar, &state.config)
        }
    }
}

fn deny(jar: CookieJar, config: &Config) -> Response {
    (clear_session_cookies(jar, config), Redirect::temporary(LOGIN_PATH)).into_response()
}
