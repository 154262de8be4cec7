//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical unauthenticated redirect behavior,
//! and none of them may decide before the auth context is ready.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthContext;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where a fresh login lands.
pub const HOME_PATH: &str = "/dashboard";

/// Whether a guarded page should leave for the login screen right now.
#[must_use]
pub fn should_redirect_unauth(auth: &AuthContext) -> bool {
    auth.is_ready_untracked() && !auth.is_authenticated_untracked()
}

/// Redirect to [`LOGIN_PATH`] whenever auth is ready and no token is held.
pub fn install_unauth_redirect<F>(auth: AuthContext, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if auth.is_ready() && !auth.is_authenticated() {
            navigate(LOGIN_PATH, NavigateOptions::default());
        }
    });
}
