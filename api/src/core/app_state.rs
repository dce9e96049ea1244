use std::sync::Arc;

use advisor::{Advisor, AdvisorConfig};
use ai_llm_service::{
    LlmModelConfig, config::default_config::config_openai_chat, health_service::HealthService,
    services::open_ai_service::OpenAiService,
};
use doc_context::{DocContextConfig, DocumentContextCache};
use tracing::info;

use crate::error_handler::AppError;

/// Default request body limit for uploads (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Provider probe used by `/health?probe=true`.
pub struct ProviderProbe {
    pub health: HealthService,
    pub cfg: LlmModelConfig,
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub advisor: Arc<Advisor>,
    /// Same cache the advisor reads from; refreshed by the admin route.
    pub cache: Arc<DocumentContextCache>,
    pub provider: Option<ProviderProbe>,
    /// Required in `X-Admin-Secret` for cache refresh when set.
    pub admin_secret: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State without a provider probe; used by tests and embedders.
    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self {
            cache: Arc::clone(advisor.cache()),
            advisor,
            provider: None,
            admin_secret: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Load shared state from environment variables.
    ///
    /// # Errors
    /// [`AppError::Config`] when the provider config is missing or invalid.
    pub fn from_env() -> Result<Self, AppError> {
        let llm_cfg = config_openai_chat().map_err(|e| AppError::Config(e.to_string()))?;
        let service =
            OpenAiService::new(llm_cfg.clone()).map_err(|e| AppError::Config(e.to_string()))?;
        let health = HealthService::new(Some(10)).map_err(|e| AppError::Config(e.to_string()))?;

        let docs_cfg = DocContextConfig::from_env();
        let cache = Arc::new(docs_cfg.build_cache());
        let advisor = Arc::new(Advisor::new(
            Arc::new(service),
            Arc::clone(&cache),
            AdvisorConfig::from_env(),
        ));

        let admin_secret = std::env::var("ADMIN_SECRET")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        info!(
            docs_dir = %docs_cfg.docs_dir.display(),
            ttl_secs = docs_cfg.ttl.as_secs(),
            model = %llm_cfg.model,
            admin_protected = admin_secret.is_some(),
            max_upload_bytes,
            "application state initialized"
        );

        Ok(Self {
            advisor,
            cache,
            provider: Some(ProviderProbe {
                health,
                cfg: llm_cfg,
            }),
            admin_secret,
            max_upload_bytes,
        })
    }
}
