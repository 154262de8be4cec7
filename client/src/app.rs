//! Root component and route table.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` provides the single `AuthContext` before any route renders, so every
//! page sees the same token store and readiness flag. Resolution of a stored
//! session starts as soon as the context exists in the browser.

#[cfg(not(feature = "hydrate"))]
use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::pages::dashboard::DashboardPage;
use crate::pages::login::LoginPage;
use crate::state::auth::AuthContext;

#[cfg(feature = "hydrate")]
fn provide_session() -> AuthContext {
    crate::state::auth::provide_browser_auth_context()
}

#[cfg(not(feature = "hydrate"))]
fn provide_session() -> AuthContext {
    crate::state::auth::provide_auth_context(
        Arc::new(crate::net::api::HttpIdentityApi::default()),
        Arc::new(crate::state::token::MemoryStorage::new()),
    )
}

#[component]
pub fn App() -> impl IntoView {
    let _auth = provide_session();

    view! {
        <Router>
            <main>
                <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                    <Route path=path!("/auth/login") view=LoginPage />
                    <Route path=path!("/dashboard") view=DashboardPage />
                </Routes>
            </main>
        </Router>
    }
}
