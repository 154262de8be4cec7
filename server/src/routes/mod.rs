//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard is a static build served from `SITE_DIR`. The same router
//! exposes the identity proxy under `/api/auth` and wraps everything in the
//! edge guard, so protected pages never reach the browser without a session
//! the identity service still accepts.

pub mod auth;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{delete, get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::edge_guard::edge_guard;
use crate::state::AppState;

/// Where `/` lands.
pub const HOME_PATH: &str = "/dashboard";

/// Identity proxy routes consumed by the browser client.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/logout-all", post(auth::logout_all))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/sessions", get(auth::list_sessions))
        .route("/api/auth/sessions/{id}", delete(auth::revoke_session))
}

/// Full application: API, health check, static site, edge guard.
pub fn app(state: AppState) -> Router {
    let site = ServeDir::new(&state.config.site_dir).append_index_html_on_directories(true);

    api_routes()
        .route("/", get(redirect_root))
        .route("/healthz", get(healthz))
        .fallback_service(site)
        .layer(axum::middleware::from_fn_with_state(state.clone(), edge_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn redirect_root() -> Redirect {
    Redirect::temporary(HOME_PATH)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
