//! HTTP front door of the chat backend.
//!
//! Routes:
//! - `POST /api/chat`, `POST /api/chat/upload`: answer a question;
//! - `POST /api/context/refresh`, `GET /api/context/status`: cache admin;
//! - `GET /health`.
//!
//! Errors are always `{ errorCategory, errorMessage }` JSON.

use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    middleware_layer::panic_handler::handle_panic,
    routes::{
        chat::{chat_route::chat, upload_route::chat_upload},
        context::context_route::{context_status, refresh_context},
        health_route::health,
    },
};

pub use crate::routes::context::context_route::ADMIN_SECRET_HEADER;

/// Builds the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/chat", post(chat))
        .route(
            "/api/chat/upload",
            post(chat_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/context/refresh", post(refresh_context))
        .route("/api/context/status", get(context_status))
        .route("/health", get(health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Loads state from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env()?);

    let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(AppError::Bind)?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
