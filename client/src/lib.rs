//! Browser-side session layer for the Filebay dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! `state` owns the token store and the auth context that every page reads,
//! `net` talks to the server's `/api/auth/*` proxy, `util` holds route-guard
//! helpers, `pages` holds the login and dashboard screens, and `app` wires
//! them into the router. Browser glue (`localStorage`, `fetch`, console
//! logging, mounting) is compiled only with the `hydrate` feature so the rest
//! builds and tests natively.

pub mod app;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry: install console logging and the panic hook, then mount
/// the app.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(app::App);
}
