//! GET /health: liveness, plus an optional provider probe (`?probe=true`).

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};

use crate::{core::app_state::AppState, error_handler::AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct HealthQuery {
    #[serde(default)]
    pub probe: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the provider probe failed.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<HealthStatus>,
}

pub async fn health(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HealthQuery>, QueryRejection>,
) -> AppResult<Json<HealthResponse>> {
    let Query(q) = query?;
    let provider = match (&state.provider, q.probe) {
        (Some(p), true) => Some(p.health.check(&p.cfg).await),
        _ => None,
    };
    let status = match &provider {
        Some(p) if !p.ok => "degraded",
        _ => "ok",
    };
    Ok(Json(HealthResponse { status, provider }))
}
