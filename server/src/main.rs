mod config;
mod middleware;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let identity = services::identity::HttpIdentityService::new(&config.identity_url, config.identity_timeouts)
        .expect("identity client init failed");
    tracing::info!(
        identity_url = %config.identity_url,
        site_dir = %config.site_dir.display(),
        protected = ?config.protected_prefixes,
        "identity client initialized"
    );

    let port = config.port;
    let state = state::AppState::new(config, Arc::new(identity));
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "filebay listening");
    axum::serve(listener, app).await.expect("server failed");
}
