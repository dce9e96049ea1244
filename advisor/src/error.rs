//! Typed error for the advisor crate, and the stable categories the HTTP layer
//! maps to statuses.

use std::fmt;

use ai_llm_service::{AiLlmError, FailureCategory};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Question absent, empty or whitespace-only.
    #[error("question must not be empty")]
    MissingQuestion,

    /// Well-formed call with unusable content (unknown analysis kind,
    /// unsupported upload format, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The completion provider failed.
    #[error("completion failed: {0}")]
    Completion(#[from] AiLlmError),
}

/// Client-visible error category with a stable wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    MissingQuestion,
    InvalidRequest,
    QuotaExhausted,
    InvalidCredential,
    ModelUnavailable,
    RateLimited,
    InternalError,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::MissingQuestion => "MISSING_QUESTION",
            ErrorCategory::InvalidRequest => "INVALID_REQUEST",
            ErrorCategory::QuotaExhausted => "QUOTA_EXHAUSTED",
            ErrorCategory::InvalidCredential => "INVALID_CREDENTIAL",
            ErrorCategory::ModelUnavailable => "MODEL_UNAVAILABLE",
            ErrorCategory::RateLimited => "RATE_LIMITED",
            ErrorCategory::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<FailureCategory> for ErrorCategory {
    fn from(c: FailureCategory) -> Self {
        match c {
            FailureCategory::QuotaExhausted => ErrorCategory::QuotaExhausted,
            FailureCategory::InvalidCredential => ErrorCategory::InvalidCredential,
            FailureCategory::ModelUnavailable => ErrorCategory::ModelUnavailable,
            FailureCategory::RateLimited => ErrorCategory::RateLimited,
            FailureCategory::Unspecified => ErrorCategory::InternalError,
        }
    }
}

impl AdvisorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdvisorError::MissingQuestion => ErrorCategory::MissingQuestion,
            AdvisorError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            AdvisorError::Completion(e) => e.category().into(),
        }
    }

    /// Message safe to show to end users. Provider details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AdvisorError::MissingQuestion | AdvisorError::InvalidRequest(_) => self.to_string(),
            AdvisorError::Completion(e) => match e.category() {
                FailureCategory::QuotaExhausted => {
                    "the language model quota is exhausted; try again later".into()
                }
                FailureCategory::InvalidCredential => {
                    "the language model credential was rejected".into()
                }
                FailureCategory::ModelUnavailable => {
                    "the configured language model is unavailable".into()
                }
                FailureCategory::RateLimited => {
                    "too many requests to the language model; retry shortly".into()
                }
                FailureCategory::Unspecified => "the language model request failed".into(),
            },
        }
    }
}
