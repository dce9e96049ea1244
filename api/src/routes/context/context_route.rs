//! Document cache administration.
//!
//! - `POST /api/context/refresh`: reload now, return the reload report.
//!   Guarded by `X-Admin-Secret` when `ADMIN_SECRET` is configured.
//! - `GET /api/context/status`: cache snapshot.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use doc_context::{CacheStatus, ReloadReport};
use tracing::{info, instrument, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

pub const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

#[instrument(name = "context_refresh_route", skip_all)]
pub async fn refresh_context(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ReloadReport>> {
    if let Some(expected) = state.admin_secret.as_deref() {
        let provided = headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();
        if provided != expected {
            warn!("context refresh rejected: bad admin secret");
            return Err(AppError::Unauthorized);
        }
    }

    let report = state.cache.force_refresh().await;
    info!(
        files = report.files_seen,
        failed = report.failures.len(),
        changed = report.changed,
        "context refreshed on demand"
    );
    Ok(Json(report))
}

pub async fn context_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.cache.status().await)
}
