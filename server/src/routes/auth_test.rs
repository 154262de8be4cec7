use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::{CheckOutcome, MockIdentity, test_app_state, test_config};

fn mock() -> Arc<MockIdentity> {
    Arc::new(MockIdentity::new(CheckOutcome::Valid))
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({ "username": username, "password": password }).to_string();
    Request::post("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, "Mozilla/5.0 (test)")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

// =============================================================================
// cookie helpers
// =============================================================================

#[test]
fn session_cookie_is_http_only_lax_root() {
    let cookie = session_cookie(&test_config(), "tok".into());
    assert_eq!(cookie.name(), "session_token");
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
}

#[test]
fn session_token_prefers_plain_then_secure_name() {
    let config = test_config();
    let jar = CookieJar::new().add(Cookie::new("__Secure-session_token", "secure-tok"));
    assert_eq!(session_token(&jar, &config).as_deref(), Some("secure-tok"));

    let jar = jar.add(Cookie::new("session_token", "plain-tok"));
    assert_eq!(session_token(&jar, &config).as_deref(), Some("plain-tok"));
}

#[test]
fn session_token_ignores_blank_cookie() {
    let jar = CookieJar::new().add(Cookie::new("session_token", "  "));
    assert_eq!(session_token(&jar, &test_config()), None);
}

#[test]
fn clear_session_cookies_expires_both_names() {
    let jar = clear_session_cookies(CookieJar::new(), &test_config());
    for name in ["session_token", "__Secure-session_token"] {
        let cookie = jar.get(name).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
    assert_eq!(jar.get("__Secure-session_token").unwrap().secure(), Some(true));
    assert_eq!(jar.get("session_token").unwrap().secure(), Some(false));
}

#[test]
fn bearer_header_wins_over_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, "bearer header-tok".parse().unwrap());
    let jar = CookieJar::new().add(Cookie::new("session_token", "cookie-tok"));
    assert_eq!(request_token(&headers, &jar, &test_config()).as_deref(), Some("header-tok"));
}

#[test]
fn non_bearer_scheme_falls_back_to_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0".parse().unwrap());
    let jar = CookieJar::new().add(Cookie::new("session_token", "cookie-tok"));
    assert_eq!(request_token(&headers, &jar, &test_config()).as_deref(), Some("cookie-tok"));
    assert_eq!(request_token(&headers, &CookieJar::new(), &test_config()), None);
}

#[test]
fn transport_errors_map_to_bad_gateway() {
    let response = identity_error_response(IdentityError::Request("timeout".into()));
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = identity_error_response(IdentityError::Rejected { status: 403, detail: "Not your session.".into() });
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// handlers
// =============================================================================

#[tokio::test]
async fn login_sets_session_cookie_and_returns_token() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity.clone()));

    let response = app.oneshot(login_request("alice", "secret")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("session_token=tok-alice") && c.contains("HttpOnly")));
    assert_eq!(body_json(response).await["access_token"], "tok-alice");
    assert_eq!(identity.user_agents.lock().unwrap().as_slice(), &[Some("Mozilla/5.0 (test)".to_owned())]);
}

#[tokio::test]
async fn login_rejected_passes_detail_through() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity));

    let response = app.oneshot(login_request("alice", "wrong")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(body_json(response).await["detail"], "Invalid username or password.");
}

#[tokio::test]
async fn me_requires_token() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity.clone()));

    let response = app
        .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(identity.calls().is_empty());
}

#[tokio::test]
async fn me_accepts_session_cookie() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity));

    let request = Request::get("/api/auth/me")
        .header(COOKIE, "session_token=tok-alice")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["group"]["name"], "staff");
}

#[tokio::test]
async fn logout_clears_cookie_even_when_remote_fails() {
    let mut identity = MockIdentity::new(CheckOutcome::Valid);
    identity.logout_fails = true;
    let identity = Arc::new(identity);
    let app = crate::routes::app(test_app_state(identity.clone()));

    let request = Request::post("/api/auth/logout")
        .header(AUTHORIZATION, "Bearer tok-alice")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(set_cookies(&response).iter().any(|c| c.starts_with("session_token=;") && c.contains("Max-Age=0")));
    assert_eq!(identity.calls(), vec!["logout"]);
}

#[tokio::test]
async fn logout_without_token_skips_remote() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity.clone()));

    let response = app
        .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(identity.calls().is_empty());
}

#[tokio::test]
async fn sessions_list_and_revoke() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity));

    let list = Request::get("/api/auth/sessions")
        .header(AUTHORIZATION, "Bearer tok-alice")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await[0]["session_id"], 9);

    let revoke_missing = Request::delete("/api/auth/sessions/10")
        .header(AUTHORIZATION, "Bearer tok-alice")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(revoke_missing).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Session not found.");

    let revoke = Request::delete("/api/auth/sessions/9")
        .header(AUTHORIZATION, "Bearer tok-alice")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(revoke).await.unwrap().status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn logout_all_clears_cookie() {
    let identity = mock();
    let app = crate::routes::app(test_app_state(identity.clone()));

    let request = Request::post("/api/auth/logout-all")
        .header(COOKIE, "session_token=tok-alice")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(set_cookies(&response).iter().any(|c| c.contains("Max-Age=0")));
    assert_eq!(identity.calls(), vec!["logout_all"]);
}
