//! Completion client for OpenAI-compatible chat APIs.
//!
//! - [`completion`]: provider-agnostic conversation/completion types and the
//!   [`CompletionRequester`](completion::CompletionRequester) seam.
//! - [`services::open_ai_service`]: HTTP implementation.
//! - [`error_handler`]: unified error type with failure categories.
//! - [`health_service`]: best-effort provider probe for `/health`.
//! - [`telemetry`]: tracing layer scoped to this crate.

pub mod completion;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use completion::{ChatMessage, Completion, CompletionRequest, CompletionRequester, Role, Usage};
pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, FailureCategory};
