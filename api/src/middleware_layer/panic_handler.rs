use std::any::Any;

use advisor::ErrorCategory;
use axum::{http::StatusCode, response::Response};
use tracing::error;

use crate::error_handler::ErrorBody;

/// Turns a handler panic into the standard `INTERNAL_ERROR` JSON body.
/// The panic payload goes to the log only.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(panic = %detail, "handler panicked");

    ErrorBody::response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCategory::InternalError,
        "internal error".to_string(),
    )
}
