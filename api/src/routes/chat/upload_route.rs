//! POST /api/chat/upload: like `/api/chat`, with one `.docx`/`.pdf` attached.
//!
//! Multipart fields: `question`, `analysisKind`, `includeDocumentContext`,
//! `file`. The file stays in memory for the duration of the request.

use std::sync::Arc;

use advisor::{AdvisorError, AnalysisKind, AnswerRequest, UploadedDocument};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use tracing::{debug, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chat::chat_request::ChatResponse,
};

#[instrument(name = "chat_upload_route", skip_all)]
pub async fn chat_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ChatResponse>> {
    let mut multipart = multipart?;
    let limit = state.max_upload_bytes;

    let mut question = String::new();
    let mut kind: Option<String> = None;
    let mut include_context = true;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| body_error(e, limit))? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => question = text(field, limit).await?,
            "analysisKind" => kind = Some(text(field, limit).await?),
            "includeDocumentContext" => {
                include_context = parse_flag(&text(field, limit).await?)?;
            }
            "file" => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| body_error(e, limit))?;
                if !name.is_empty() || !bytes.is_empty() {
                    file = Some((name, bytes.to_vec()));
                }
            }
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    if question.trim().is_empty() {
        return Err(AdvisorError::MissingQuestion.into());
    }

    let mut req = AnswerRequest::new(question);
    req.analysis_kind = AnalysisKind::parse_optional(kind.as_deref())?;
    req.include_document_context = include_context;
    req.upload = file
        .map(|(name, bytes)| UploadedDocument::new(name, bytes))
        .transpose()?;

    let answer = state.advisor.answer(req).await?;
    Ok(Json(ChatResponse {
        answer_text: answer.text,
        usage: answer.usage,
    }))
}

async fn text(field: Field<'_>, limit: usize) -> AppResult<String> {
    field.text().await.map_err(|e| body_error(e, limit))
}

fn body_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge(limit)
    } else {
        err.into()
    }
}

/// HTML form checkboxes send `on`; other clients send booleans.
fn parse_flag(raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "includeDocumentContext must be a boolean, got `{other}`"
        ))),
    }
}
