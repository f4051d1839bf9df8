//! HTTP server assembly
//!
//! Builds the axum application with the enforcement middleware applied to
//! every route, plus the minimal public pages the enforcement points
//! redirect to. Page bodies are deliberately generic; denial details live
//! in status codes and redirects only.

use crate::enforce::server::{GuardState, enforce};
use crate::error::ServerError;
use crate::util::find_available_port;
use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::Html,
    routing::get,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 18910;

/// Build the application router with enforcement applied
pub fn router(state: GuardState) -> Router {
    Router::new()
        .route("/login", get(login_page))
        .route("/unauthorized", get(unauthorized_page))
        .route("/api/auth/health", get(health))
        .fallback(app_page)
        .layer(middleware::from_fn_with_state(state, enforce))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server and return a cancellation token for shutdown
///
/// Port discovery is used to find an available port if the configured port
/// is taken.
pub async fn run_server(
    bind: SocketAddr,
    state: GuardState,
) -> Result<CancellationToken, ServerError> {
    let host = bind.ip().to_string();
    let actual_port = find_available_port(&host, bind.port()).await?;
    let bind_addr = SocketAddr::new(bind.ip(), actual_port);

    let app = router(state);
    let listener = TcpListener::bind(bind_addr).await?;

    info!("Route guard server listening on http://{}", bind_addr);

    let ct = CancellationToken::new();
    let shutdown_ct = ct.clone();

    tokio::spawn(async move {
        let shutdown = async move { shutdown_ct.cancelled().await };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    Ok(ct)
}

/// Start the HTTP server and wait for a shutdown signal (Ctrl+C)
pub async fn run_server_blocking(bind: SocketAddr, state: GuardState) -> Result<(), ServerError> {
    let ct = run_server(bind, state).await?;

    info!("Press Ctrl+C to stop the server");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        _ = ct.cancelled() => {
            info!("Server cancelled");
        }
    }

    ct.cancel();
    info!("Server stopped");
    Ok(())
}

async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}

async fn unauthorized_page() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::FORBIDDEN,
        Html("<!doctype html><title>Unauthorized</title><h1>You do not have access to this page</h1>"),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Stand-in for the application's pages; everything the guard allows
/// through lands here
async fn app_page() -> Html<&'static str> {
    Html("<!doctype html><title>routeguard</title><div id=\"app\"></div>")
}
