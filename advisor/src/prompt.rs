//! Conversation builder: analysis-kind system message with the document
//! context, and a user message with the question and optional upload.

use ai_llm_service::{ChatMessage, CompletionRequest};

use crate::analysis::AnalysisKind;

pub const GENERIC_SYSTEM: &str = "\
You are a banking assistant for internal staff. Answer precisely and concisely.
Use the reference documents below as ground truth; if they do not cover the question, say so.";

pub const CREDIT_RISK_SYSTEM: &str = "\
You are a credit risk analyst. Assess borrower risk, exposure, collateral and covenants.
Quote the limits and thresholds from the reference documents and state which one applies.";

pub const FINANCIAL_STATEMENTS_SYSTEM: &str = "\
You are a financial statements analyst. Work from balance sheet, income statement and cash flow figures,
compute ratios when useful and show the figures you relied on.";

pub const REGULATORY_COMPLIANCE_SYSTEM: &str = "\
You are a regulatory compliance officer. Identify the applicable rules, point out gaps,
and cite the policy section from the reference documents for every conclusion.";

pub fn system_template(kind: Option<AnalysisKind>) -> &'static str {
    match kind {
        None => GENERIC_SYSTEM,
        Some(AnalysisKind::CreditRisk) => CREDIT_RISK_SYSTEM,
        Some(AnalysisKind::FinancialStatements) => FINANCIAL_STATEMENTS_SYSTEM,
        Some(AnalysisKind::RegulatoryCompliance) => REGULATORY_COMPLIANCE_SYSTEM,
    }
}

/// Template plus a labeled reference block. Context beyond `max_chars`
/// characters is cut at a char boundary.
///
/// Returns the message and the number of context chars included.
pub fn build_system_message(
    kind: Option<AnalysisKind>,
    context: &str,
    max_chars: usize,
) -> (String, usize) {
    let mut out = String::from(system_template(kind));
    let context = context.trim();
    if context.is_empty() || max_chars == 0 {
        return (out, 0);
    }

    let included = safe_truncate(context, max_chars);
    out.push_str("\n\nReference documents:\n");
    out.push_str(included);
    if included.len() < context.len() {
        out.push_str("\n[reference documents truncated]");
    }
    (out, included.chars().count())
}

/// Question, then the uploaded document's text (if any) in its own block.
pub fn build_user_message(question: &str, upload: Option<(&str, &str)>) -> String {
    let mut out = String::from(question.trim());
    if let Some((name, text)) = upload {
        let text = text.trim();
        if !text.is_empty() {
            out.push_str("\n\nUploaded document `");
            out.push_str(name);
            out.push_str("`:\n");
            out.push_str(text);
        }
    }
    out
}

pub fn build_request(system: String, user: String) -> CompletionRequest {
    CompletionRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
    }
}

/// First `max_chars` characters of `s`.
fn safe_truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
