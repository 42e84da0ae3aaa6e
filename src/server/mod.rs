//! Browser-facing HTTP surface: login flow, dashboard and device actions.

mod cookies;
mod render;
mod routes;
mod state;

pub use cookies::SESSION_COOKIE_NAME;
pub use render::escape_html;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::MowerError;

/// Build the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/login", get(routes::login))
        .route("/callback", get(routes::callback))
        .route("/dashboard", get(routes::dashboard))
        .route("/start", post(routes::start))
        .route("/park", post(routes::park))
        .route("/logout", get(routes::logout).post(routes::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: AppConfig) -> Result<(), MowerError> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        redirect_uri = %config.oauth.redirect_uri,
        "Server running"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
