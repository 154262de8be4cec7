//! Dashboard page: signed-in user and their active sessions.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the authenticated landing route. It waits for the auth context to
//! become ready, sends anonymous visitors to the login page, and loads the
//! session list once a token is held.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wire::SessionItem;

use crate::state::auth::use_auth;
use crate::util::auth::install_unauth_redirect;

/// One-line description of a session for the list.
pub(crate) fn session_label(item: &SessionItem) -> String {
    let client = item.client_name.as_deref().filter(|c| !c.is_empty()).unwrap_or("Unknown client");
    match item.ip_address.as_deref() {
        Some(ip) if !ip.is_empty() => format!("{client} ({ip})"),
        _ => client.to_owned(),
    }
}

/// Whether `item` is the session this tab is signed in with.
pub(crate) fn is_current_session(item: &SessionItem, token: Option<&str>) -> bool {
    token == Some(item.token.as_str())
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    install_unauth_redirect(auth.clone(), use_navigate());

    let sessions = RwSignal::new(Vec::<SessionItem>::new());
    let info = RwSignal::new(String::new());
    let requested = RwSignal::new(false);

    let load_auth = auth.clone();
    Effect::new(move || {
        if requested.get() || !load_auth.is_ready() || !load_auth.is_authenticated() {
            return;
        }
        requested.set(true);
        #[cfg(feature = "hydrate")]
        {
            let auth = load_auth.clone();
            leptos::task::spawn_local(async move {
                match auth.list_sessions().await {
                    Ok(items) => sessions.set(items),
                    Err(e) => info.set(format!("Could not load sessions: {e}")),
                }
            });
        }
    });

    let revoke_auth = auth.clone();
    let on_revoke = move |session_id: i64| {
        #[cfg(feature = "hydrate")]
        {
            let auth = revoke_auth.clone();
            leptos::task::spawn_local(async move {
                match auth.revoke_session(session_id).await {
                    Ok(()) => sessions.update(|items| items.retain(|s| s.session_id != session_id)),
                    Err(e) => info.set(format!("Could not revoke session: {e}")),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&revoke_auth, session_id);
        }
    };

    let logout_auth = auth.clone();
    let on_logout = move |_: leptos::ev::MouseEvent| {
        #[cfg(feature = "hydrate")]
        {
            let auth = logout_auth.clone();
            leptos::task::spawn_local(async move {
                auth.logout().await;
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href(crate::util::auth::LOGIN_PATH);
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &logout_auth;
        }
    };

    let header_auth = auth.clone();
    let list_auth = auth;

    view! {
        <div class="dashboard-page">
            <header class="dashboard-header">
                <h1>"Filebay"</h1>
                <span class="dashboard-user">
                    {move || header_auth.user().map(|u| u.username).unwrap_or_default()}
                </span>
                <button class="dashboard-logout" on:click=on_logout>"Sign Out"</button>
            </header>
            <section class="dashboard-sessions">
                <h2>"Active sessions"</h2>
                <ul>
                    {move || {
                        let token = list_auth.token();
                        sessions
                            .get()
                            .into_iter()
                            .map(|item| {
                                let id = item.session_id;
                                let current = is_current_session(&item, token.as_deref());
                                let label = session_label(&item);
                                let on_revoke = on_revoke.clone();
                                view! {
                                    <li class="session-row">
                                        <span>{label}</span>
                                        <span class="session-row__seen">{item.last_accessed}</span>
                                        <Show
                                            when=move || !current
                                            fallback=|| view! { <span class="session-row__current">"This device"</span> }
                                        >
                                            {
                                                let on_revoke = on_revoke.clone();
                                                view! {
                                                    <button on:click=move |_| on_revoke(id)>"Revoke"</button>
                                                }
                                            }
                                        </Show>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
                <Show when=move || !info.get().is_empty()>
                    <p class="dashboard-message">{move || info.get()}</p>
                </Show>
            </section>
        </div>
    }
}
