use ai_llm_service::Usage;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/chat`.
///
/// Fields are optional at the wire level so that a missing question is
/// reported as `MISSING_QUESTION` rather than a JSON shape error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    /// `credit_risk`, `financial_statements` or `regulatory_compliance`.
    #[serde(default)]
    pub analysis_kind: Option<String>,
    /// Defaults to `true`.
    #[serde(default)]
    pub include_document_context: Option<bool>,
}

/// Response payload for both chat routes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub answer_text: String,
    pub usage: Usage,
}
