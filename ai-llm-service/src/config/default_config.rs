//! Default completion config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`   = bearer credential (mandatory)
//! - `OPENAI_BASE_URL`  = API base, default `https://api.openai.com`
//! - `OPENAI_MODEL`     = model id, default `gpt-4o-mini`
//! - `LLM_TEMPERATURE`  = optional sampling temperature (`0.0..=2.0`), default `0.2`
//! - `LLM_MAX_TOKENS`   = optional max output tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u32), default 60

use crate::{
    config::llm_model_config::{DEFAULT_TIMEOUT_SECS, LlmModelConfig},
    error_handler::{
        AiLlmError, ConfigError, env_opt_f32, env_opt_u32, must_env, validate_http_endpoint,
        validate_range_f32,
    },
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Constructs the chat-completion config used to answer questions.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if `OPENAI_API_KEY` is missing
/// - [`ConfigError::InvalidFormat`] if `OPENAI_BASE_URL` is not http(s)
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for bad numbers
/// - [`ConfigError::EmptyModel`] if `OPENAI_MODEL` is set but blank
pub fn config_openai_chat() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("OPENAI_API_KEY")?;

    let endpoint = std::env::var("OPENAI_BASE_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    validate_http_endpoint("OPENAI_BASE_URL", endpoint.trim())?;

    let model = match std::env::var("OPENAI_MODEL") {
        Ok(m) if m.trim().is_empty() => return Err(ConfigError::EmptyModel.into()),
        Ok(m) => m.trim().to_string(),
        Err(_) => DEFAULT_MODEL.to_string(),
    };

    let temperature = env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_opt_u32("LLM_TIMEOUT_SECS")?
        .map(u64::from)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(LlmModelConfig {
        model,
        endpoint: endpoint.trim().to_string(),
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}
