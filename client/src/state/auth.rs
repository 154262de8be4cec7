//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards, nav, and forms to coordinate login redirects and
//! identity-dependent rendering. `AuthContext` is the only auth surface the
//! rest of the app touches; it is provided once through Leptos context.
//!
//! LIFECYCLE
//! =========
//! At tab start the token and profile are unknown and `ready` is false.
//! `ensure_resolved` rehydrates the persisted token, asks the identity API
//! who it belongs to, publishes the result, and flips `ready` exactly once.
//! After that only `login` and `logout` move the state.
//!
//! Every state change from `login` or `logout` bumps an epoch counter. An
//! identity call that was in flight across a bump never publishes its
//! result, so a slow resolve cannot resurrect a session the user ended or
//! replace one they just started.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use leptos::prelude::*;
use wire::{SessionItem, UserProfile};

use super::token::{TokenStorage, TokenStore};
use crate::net::api::{ApiError, IdentityApi};

/// User-facing auth failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The identity service refused the credentials or token.
    #[error("{0}")]
    CredentialsRejected(String),
    /// The identity service could not be reached or answered unexpectedly.
    #[error("{0}")]
    Service(String),
    /// Login succeeded but the response carried no access token.
    #[error("login response did not include an access token")]
    MissingToken,
    /// The operation needs a token and none is held.
    #[error("not signed in")]
    NotAuthenticated,
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        if err.is_rejection() {
            return Self::CredentialsRejected(err.to_string());
        }
        Self::Service(err.to_string())
    }
}

/// Shared auth state and operations. Cloning yields another handle to the
/// same cells.
#[derive(Clone)]
pub struct AuthContext {
    token: TokenStore,
    user: ArcRwSignal<Option<UserProfile>>,
    ready: ArcRwSignal<bool>,
    resolve_started: Arc<AtomicBool>,
    epoch: Arc<AtomicU64>,
    api: Arc<dyn IdentityApi>,
}

impl AuthContext {
    #[must_use]
    pub fn new(api: Arc<dyn IdentityApi>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            token: TokenStore::new(storage),
            user: ArcRwSignal::new(None),
            ready: ArcRwSignal::new(false),
            resolve_started: Arc::new(AtomicBool::new(false)),
            epoch: Arc::new(AtomicU64::new(0)),
            api,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read()
    }

    #[must_use]
    pub fn token_untracked(&self) -> Option<String> {
        self.token.read_untracked()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.user.get()
    }

    #[must_use]
    pub fn user_untracked(&self) -> Option<UserProfile> {
        self.user.get_untracked()
    }

    /// True iff a token is held. Computed, never stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_present()
    }

    #[must_use]
    pub fn is_authenticated_untracked(&self) -> bool {
        self.token.is_present_untracked()
    }

    /// Whether the first resolution attempt has finished. Gate any
    /// signed-in/signed-out rendering on this.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    #[must_use]
    pub fn is_ready_untracked(&self) -> bool {
        self.ready.get_untracked()
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Rehydrate the session from durable storage. Only the first call does
    /// any work; later calls return immediately.
    pub async fn ensure_resolved(&self) {
        if self.resolve_started.swap(true, Ordering::SeqCst) {
            return;
        }

        if !self.token.is_present_untracked() {
            if let Some(token) = self.token.load_persisted() {
                self.resolve_token(token).await;
            }
        }

        self.mark_ready();
    }

    async fn resolve_token(&self, token: String) {
        let epoch = self.current_epoch();
        match self.api.current_user(&token).await {
            Ok(user) => {
                if self.current_epoch() != epoch || self.token.is_present_untracked() {
                    log::debug!("session changed during resolve; discarding result");
                    return;
                }
                self.token.write(Some(token));
                self.user.set(Some(user.into()));
            }
            Err(e) => {
                log::info!("stored session not restored: {e}");
            }
        }
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn mark_ready(&self) {
        if !self.ready.get_untracked() {
            self.ready.set(true);
        }
    }

    // -------------------------------------------------------------------------
    // Login / logout
    // -------------------------------------------------------------------------

    /// Sign in with username and password, then load the profile.
    ///
    /// # Errors
    ///
    /// `CredentialsRejected` with the service's message when the login is
    /// refused, `Service` on transport failure, `MissingToken` when the
    /// response has no access token. The token store is untouched on error.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let resp = self.api.login(username, password).await?;
        let token = resp.token().ok_or(AuthError::MissingToken)?.to_owned();
        let epoch = self.bump_epoch();
        self.token.write(Some(token.clone()));
        self.user.set(None);

        match self.api.current_user(&token).await {
            Ok(user) if self.current_epoch() == epoch => self.user.set(Some(user.into())),
            Ok(_) => log::debug!("session changed during profile fetch; discarding profile"),
            Err(e) => log::warn!("profile fetch after login failed: {e}"),
        }
        Ok(())
    }

    /// Sign out. The remote call is best-effort; local state is cleared
    /// whether it succeeds, fails, or this future is dropped early.
    pub async fn logout(&self) {
        self.bump_epoch();
        let _cleanup = ClearOnDrop(self);
        if let Some(token) = self.token.read_untracked() {
            if let Err(e) = self.api.logout(&token).await {
                log::warn!("remote logout failed: {e}");
            }
        }
    }

    fn clear(&self) {
        self.bump_epoch();
        self.token.write(None);
        self.user.set(None);
    }

    // -------------------------------------------------------------------------
    // Sessions
    // -------------------------------------------------------------------------

    /// Sessions the identity service tracks for the current user.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a token; otherwise the mapped API error.
    pub async fn list_sessions(&self) -> Result<Vec<SessionItem>, AuthError> {
        let token = self.token.read_untracked().ok_or(AuthError::NotAuthenticated)?;
        self.api.list_sessions(&token).await.map_err(AuthError::from)
    }

    /// Revoke one of the current user's sessions.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a token; otherwise the mapped API error.
    pub async fn revoke_session(&self, session_id: i64) -> Result<(), AuthError> {
        let token = self.token.read_untracked().ok_or(AuthError::NotAuthenticated)?;
        self.api.revoke_session(&token, session_id).await.map_err(AuthError::from)
    }
}

/// Clears token and profile when dropped.
struct ClearOnDrop<'a>(&'a AuthContext);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Create the auth context, provide it to descendants, and start
/// resolution in the browser.
pub fn provide_auth_context(api: Arc<dyn IdentityApi>, storage: Arc<dyn TokenStorage>) -> AuthContext {
    let auth = AuthContext::new(api, storage);
    provide_context(auth.clone());

    #[cfg(feature = "hydrate")]
    {
        let auth = auth.clone();
        leptos::task::spawn_local(async move { auth.ensure_resolved().await });
    }

    auth
}

/// Browser wiring: `fetch` transport and `localStorage`.
#[cfg(feature = "hydrate")]
pub fn provide_browser_auth_context() -> AuthContext {
    provide_auth_context(
        Arc::new(crate::net::api::HttpIdentityApi::default()),
        Arc::new(super::token::BrowserStorage),
    )
}

/// The auth context provided by [`provide_auth_context`].
///
/// # Panics
///
/// Panics if called outside a component tree that provided the context.
#[must_use]
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}
