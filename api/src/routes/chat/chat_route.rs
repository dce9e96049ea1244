//! POST /api/chat: answers a question with the cached document context.

use std::sync::Arc;

use advisor::{AnalysisKind, AnswerRequest};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /api/chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the maximum LTV?","analysisKind":"credit_risk"}'
/// ```
#[instrument(name = "chat_route", skip_all)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = payload?;

    let mut req = AnswerRequest::new(body.question.unwrap_or_default());
    req.analysis_kind = AnalysisKind::parse_optional(body.analysis_kind.as_deref())?;
    req.include_document_context = body.include_document_context.unwrap_or(true);

    let answer = state.advisor.answer(req).await?;
    Ok(Json(ChatResponse {
        answer_text: answer.text,
        usage: answer.usage,
    }))
}
