//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums (e.g., [`ConfigError`],
//! [`HealthError`], [`ProviderError`]). Every error can be reduced to a
//! [`FailureCategory`], which is what callers map to user-facing statuses.
//! Small helpers for reading/validating environment variables are provided and
//! return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Failure categories                                                        */
/* ------------------------------------------------------------------------- */

/// Coarse classification of a failed completion call.
///
/// The set is closed: every [`AiLlmError`] maps to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Billing quota or credit exhausted on the provider account.
    QuotaExhausted,
    /// Credential missing, malformed or rejected.
    InvalidCredential,
    /// Requested model does not exist, is not accessible, or is overloaded.
    ModelUnavailable,
    /// Too many requests in a time window.
    RateLimited,
    /// Anything else (timeouts, transport, decoding, unexpected statuses).
    Unspecified,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureCategory::QuotaExhausted => "quota exhausted",
            FailureCategory::InvalidCredential => "invalid credential",
            FailureCategory::ModelUnavailable => "model unavailable",
            FailureCategory::RateLimited => "rate limited",
            FailureCategory::Unspecified => "unspecified failure",
        };
        f.write_str(s)
    }
}

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Health-check/connectivity/decoding errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Errors reported by (or about) the completion provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl AiLlmError {
    /// Reduces the error to the category callers map to statuses.
    pub fn category(&self) -> FailureCategory {
        match self {
            AiLlmError::Provider(p) => p.category(),
            AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY")) => {
                FailureCategory::InvalidCredential
            }
            AiLlmError::Health(HealthError::HttpStatus(http)) => http.category(),
            AiLlmError::Config(_)
            | AiLlmError::Health(_)
            | AiLlmError::HttpTransport(_)
            | AiLlmError::Timeout(_) => FailureCategory::Unspecified,
        }
    }
}

impl From<reqwest::Error> for AiLlmError {
    /// Timeouts get their own variant; everything else is a transport error.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration on the error.
            AiLlmError::Timeout(Duration::ZERO)
        } else {
            AiLlmError::HttpTransport(err)
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like ports, limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OPENAI_BASE_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range (e.g., `expected 0.0..=2.0`).
        detail: &'static str,
    },

    /// Model name was empty or invalid.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Non-success HTTP response captured for diagnostics and classification.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
    /// Provider error code or type from the JSON body, when present
    /// (e.g. `insufficient_quota`, `model_not_found`).
    pub code: Option<String>,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

impl HttpError {
    /// Builds an [`HttpError`] from a raw response body, extracting the
    /// provider's error code when the body is an OpenAI-style error object.
    pub fn from_body(status: StatusCode, url: impl Into<String>, body: &str) -> Self {
        Self {
            status,
            url: url.into(),
            snippet: make_snippet(body),
            code: provider_error_code(body),
        }
    }

    /// Classifies the response by status first, then by the provider code.
    pub fn category(&self) -> FailureCategory {
        let code = self.code.as_deref().unwrap_or("");

        if code == "insufficient_quota" || code == "billing_hard_limit_reached" {
            return FailureCategory::QuotaExhausted;
        }
        if code == "invalid_api_key" {
            return FailureCategory::InvalidCredential;
        }
        if code == "model_not_found" {
            return FailureCategory::ModelUnavailable;
        }

        match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureCategory::InvalidCredential,
            StatusCode::PAYMENT_REQUIRED => FailureCategory::QuotaExhausted,
            StatusCode::TOO_MANY_REQUESTS => {
                if self.snippet.to_lowercase().contains("quota") {
                    FailureCategory::QuotaExhausted
                } else {
                    FailureCategory::RateLimited
                }
            }
            StatusCode::NOT_FOUND if self.snippet.to_lowercase().contains("model") => {
                FailureCategory::ModelUnavailable
            }
            StatusCode::SERVICE_UNAVAILABLE => FailureCategory::ModelUnavailable,
            _ => FailureCategory::Unspecified,
        }
    }
}

/// What went wrong while talking to the provider.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProviderErrorKind {
    /// No API key configured.
    MissingApiKey,
    /// Endpoint is empty or not http/https.
    InvalidEndpoint(String),
    /// Upstream answered with a non-success status.
    HttpStatus(HttpError),
    /// Response could not be decoded.
    Decode(String),
    /// Response decoded fine but carried no choices with content.
    EmptyChoices,
}

/// Error reported by the completion provider.
#[derive(Debug, Error)]
#[error("[AI LLM Service] provider error: {kind}")]
pub struct ProviderError {
    /// Failure details.
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind) -> Self {
        Self { kind }
    }

    /// Category of this provider failure.
    pub fn category(&self) -> FailureCategory {
        match &self.kind {
            ProviderErrorKind::MissingApiKey => FailureCategory::InvalidCredential,
            ProviderErrorKind::HttpStatus(http) => http.category(),
            ProviderErrorKind::InvalidEndpoint(_)
            | ProviderErrorKind::Decode(_)
            | ProviderErrorKind::EmptyChoices => FailureCategory::Unspecified,
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::MissingApiKey => f.write_str("missing API key"),
            ProviderErrorKind::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            ProviderErrorKind::HttpStatus(http) => write!(f, "{http}"),
            ProviderErrorKind::Decode(msg) => write!(f, "decode error: {msg}"),
            ProviderErrorKind::EmptyChoices => f.write_str("response contained no choices"),
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for provider health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] health probe failed: {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Body helpers                                                              */
/* ------------------------------------------------------------------------- */

/// Max characters of an upstream body kept in errors and logs.
const SNIPPET_CHARS: usize = 240;

/// Trims a response body into a single-line snippet safe for logs.
pub fn make_snippet(body: &str) -> String {
    body.trim()
        .chars()
        .take(SNIPPET_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Extracts `error.code` (or `error.type` when code is null) from an
/// OpenAI-style error body: `{ "error": { "message", "type", "code" } }`.
fn provider_error_code(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<Inner>,
    }
    #[derive(Deserialize)]
    struct Inner {
        code: Option<serde_json::Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let env: Envelope = serde_json::from_str(body).ok()?;
    let inner = env.error?;
    match inner.code {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => inner.kind.filter(|s| !s.is_empty()),
    }
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<u32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        _ => Ok(None),
    }
}

/// Parses an optional `f32` from env (`Ok(None)` if unset/empty).
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<f32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected a decimal number",
            })
        }),
        _ => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::OutOfRange`] if `value`
/// is outside `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}
