use advisor::{AdvisorError, ErrorCategory};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("upload exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("admin secret missing or wrong")]
    Unauthorized,

    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::BadRequest(_) | AppError::TooLarge(_) => ErrorCategory::InvalidRequest,
            AppError::Unauthorized => ErrorCategory::InvalidCredential,
            AppError::Advisor(e) => e.category(),
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                ErrorCategory::InternalError
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => status_for(self.category()),
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Advisor(e) => e.public_message(),
            AppError::BadRequest(_) | AppError::TooLarge(_) | AppError::Unauthorized => {
                self.to_string()
            }
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                "internal error".into()
            }
        }
    }
}

/// HTTP status of each client-visible category.
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::MissingQuestion | ErrorCategory::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCategory::QuotaExhausted | ErrorCategory::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCategory::InvalidCredential => StatusCode::UNAUTHORIZED,
        ErrorCategory::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_category: ErrorCategory,
    pub error_message: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, category: ErrorCategory, message: String) -> Response {
        let body = ErrorBody {
            error_category: category,
            error_message: message,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        }
        ErrorBody::response(status, self.category(), self.public_message())
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<axum::extract::multipart::MultipartRejection> for AppError {
    fn from(err: axum::extract::multipart::MultipartRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_statuses() {
        assert_eq!(status_for(ErrorCategory::MissingQuestion), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCategory::QuotaExhausted), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for(ErrorCategory::InvalidCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorCategory::ModelUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorCategory::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for(ErrorCategory::InternalError), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
