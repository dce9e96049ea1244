//! Question answering over the cached document context.
//!
//! Public API: [`Advisor::answer`]. It validates the question, pulls the
//! (possibly refreshed) folder context from the cache, extracts an optional
//! uploaded document in memory, builds a two-message conversation framed by
//! the analysis kind, and calls the completion provider.

mod analysis;
mod api_types;
mod cfg;
mod error;
pub mod prompt;

pub use analysis::AnalysisKind;
pub use api_types::{Answer, AnswerRequest, UploadedDocument};
pub use cfg::AdvisorConfig;
pub use error::{AdvisorError, ErrorCategory};

use std::sync::Arc;

use ai_llm_service::CompletionRequester;
use doc_context::{DocumentContextCache, extract_or_empty};
use tracing::{debug, info, warn};

/// Stateless front of the answering pipeline; cheap to share behind `Arc`.
pub struct Advisor {
    requester: Arc<dyn CompletionRequester>,
    cache: Arc<DocumentContextCache>,
    cfg: AdvisorConfig,
}

impl Advisor {
    pub fn new(
        requester: Arc<dyn CompletionRequester>,
        cache: Arc<DocumentContextCache>,
        cfg: AdvisorConfig,
    ) -> Self {
        Self {
            requester,
            cache,
            cfg,
        }
    }

    pub fn cache(&self) -> &Arc<DocumentContextCache> {
        &self.cache
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.cfg
    }

    /// Answers one question.
    ///
    /// # Errors
    /// - [`AdvisorError::MissingQuestion`] for an empty/blank question, before
    ///   the cache or the provider is touched;
    /// - [`AdvisorError::Completion`] when the provider fails.
    ///
    /// An upload that cannot be extracted is answered without its text.
    pub async fn answer(&self, req: AnswerRequest) -> Result<Answer, AdvisorError> {
        let question = req.question.trim();
        if question.is_empty() {
            return Err(AdvisorError::MissingQuestion);
        }

        let context = if req.include_document_context {
            self.cache.get_content().await
        } else {
            Arc::from("")
        };

        let upload_text = match &req.upload {
            Some(doc) => Some((doc.filename.as_str(), extract_upload(doc).await)),
            None => None,
        };

        let (system, context_chars) = prompt::build_system_message(
            req.analysis_kind,
            &context,
            self.cfg.max_context_chars,
        );
        let user = prompt::build_user_message(
            question,
            upload_text.as_ref().map(|(name, text)| (*name, text.as_str())),
        );
        debug!(
            kind = req.analysis_kind.map(|k| k.as_str()).unwrap_or("generic"),
            context_chars,
            upload = upload_text.is_some(),
            system_len = system.len(),
            user_len = user.len(),
            "conversation assembled"
        );

        let completion = self
            .requester
            .complete(&prompt::build_request(system, user))
            .await
            .map_err(|e| {
                warn!(category = %e.category(), error = %e, "completion failed");
                AdvisorError::Completion(e)
            })?;

        info!(
            model = %completion.model,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "question answered"
        );
        Ok(Answer {
            text: completion.text,
            usage: completion.usage,
            model: completion.model,
            context_chars,
        })
    }
}

/// Extracts on the blocking pool; any failure degrades to empty text.
async fn extract_upload(doc: &UploadedDocument) -> String {
    let (name, format, bytes) = (doc.filename.clone(), doc.format, doc.bytes.clone());
    match tokio::task::spawn_blocking(move || extract_or_empty(&name, format, &bytes)).await {
        Ok(out) => out.text,
        Err(e) => {
            warn!(document = %doc.filename, error = %e, "upload extraction task failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::error_handler::{HttpError, ProviderError, ProviderErrorKind};
    use ai_llm_service::{AiLlmError, Completion, CompletionRequest, Role, Usage};
    use async_trait::async_trait;
    use doc_context::{DEFAULT_TTL, DocumentSource, ExtractedText, SourceBatch, SourcedDocument};
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OneDoc {
        loads: AtomicUsize,
    }

    impl DocumentSource for OneDoc {
        fn describe(&self) -> String {
            "memory".into()
        }

        fn load(&self) -> SourceBatch {
            self.loads.fetch_add(1, Ordering::SeqCst);
            vec![SourcedDocument {
                relative: "policy.docx".into(),
                format: doc_context::DocumentFormat::Docx,
                result: Ok(ExtractedText {
                    text: "Max LTV 80%".into(),
                    warnings: vec![],
                }),
            }]
            .into()
        }
    }

    /// Records requests; answers with `reply` or the status in `fail_with`.
    #[derive(Default)]
    struct FakeRequester {
        seen: Mutex<Vec<CompletionRequest>>,
        fail_with: Option<(StatusCode, &'static str)>,
    }

    #[async_trait]
    impl CompletionRequester for FakeRequester {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AiLlmError> {
            self.seen.lock().unwrap().push(request.clone());
            if let Some((status, body)) = self.fail_with {
                let http = HttpError::from_body(status, "http://fake/v1/chat/completions", body);
                return Err(ProviderError::new(ProviderErrorKind::HttpStatus(http)).into());
            }
            Ok(Completion {
                text: "LTV is capped at 80%.".into(),
                model: "fake-model".into(),
                usage: Usage {
                    input_tokens: 12,
                    cached_input_tokens: 0,
                    output_tokens: 7,
                },
            })
        }
    }

    fn setup(requester: FakeRequester) -> (Advisor, Arc<FakeRequester>, Arc<OneDoc>) {
        let source = Arc::new(OneDoc {
            loads: AtomicUsize::new(0),
        });
        let cache = Arc::new(DocumentContextCache::new(source.clone(), DEFAULT_TTL));
        let requester = Arc::new(requester);
        let advisor = Advisor::new(requester.clone(), cache, AdvisorConfig::default());
        (advisor, requester, source)
    }

    #[tokio::test]
    async fn blank_question_touches_nothing() {
        let (advisor, requester, source) = setup(FakeRequester::default());
        for q in ["", "   ", "\n\t"] {
            let err = advisor.answer(AnswerRequest::new(q)).await.unwrap_err();
            assert_eq!(err.category(), ErrorCategory::MissingQuestion);
        }
        assert!(requester.seen.lock().unwrap().is_empty());
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn context_goes_to_system_and_question_to_user() {
        let (advisor, requester, _) = setup(FakeRequester::default());
        let mut req = AnswerRequest::new("  What is the LTV cap? ");
        req.analysis_kind = Some(AnalysisKind::CreditRisk);

        let answer = advisor.answer(req).await.unwrap();
        assert_eq!(answer.text, "LTV is capped at 80%.");
        assert_eq!(answer.usage.output_tokens, 7);
        assert!(answer.context_chars > 0);

        let seen = requester.seen.lock().unwrap();
        let msgs = &seen[0].messages;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert!(msgs[0].content.starts_with(prompt::CREDIT_RISK_SYSTEM));
        assert!(msgs[0].content.contains("--- Document: policy.docx --- Max LTV 80%"));
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].content, "What is the LTV cap?");
    }

    #[tokio::test]
    async fn context_can_be_skipped() {
        let (advisor, requester, source) = setup(FakeRequester::default());
        let mut req = AnswerRequest::new("Hello");
        req.include_document_context = false;

        let answer = advisor.answer(req).await.unwrap();
        assert_eq!(answer.context_chars, 0);
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
        assert_eq!(
            requester.seen.lock().unwrap()[0].messages[0].content,
            prompt::GENERIC_SYSTEM
        );
    }

    #[tokio::test]
    async fn unreadable_upload_is_answered_without_it() {
        let (advisor, requester, _) = setup(FakeRequester::default());
        let mut req = AnswerRequest::new("Summarize the attachment");
        req.upload = Some(UploadedDocument::new("scan.pdf", b"not a pdf".to_vec()).unwrap());

        advisor.answer(req).await.unwrap();
        let user = requester.seen.lock().unwrap()[0].messages[1].content.clone();
        assert_eq!(user, "Summarize the attachment");
    }

    #[tokio::test]
    async fn provider_failures_map_to_categories() {
        let cases = [
            (
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"error":{"code":"insufficient_quota","message":"quota"}}"#,
                ErrorCategory::QuotaExhausted,
            ),
            (StatusCode::UNAUTHORIZED, "{}", ErrorCategory::InvalidCredential),
            (
                StatusCode::NOT_FOUND,
                r#"{"error":{"code":"model_not_found","message":"The model does not exist"}}"#,
                ErrorCategory::ModelUnavailable,
            ),
            (StatusCode::TOO_MANY_REQUESTS, "slow down", ErrorCategory::RateLimited),
            (StatusCode::BAD_GATEWAY, "upstream", ErrorCategory::InternalError),
        ];
        for (status, body, expected) in cases {
            let (advisor, _, _) = setup(FakeRequester {
                fail_with: Some((status, body)),
                ..FakeRequester::default()
            });
            let err = advisor.answer(AnswerRequest::new("q")).await.unwrap_err();
            assert_eq!(err.category(), expected, "status {status}");
        }
    }
}
