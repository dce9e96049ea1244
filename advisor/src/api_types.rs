//! Public API types re-used by the HTTP layer.

use ai_llm_service::Usage;
use doc_context::DocumentFormat;

use crate::{analysis::AnalysisKind, error::AdvisorError};

/// A document attached to a single question. Held in memory only.
#[derive(Clone, Debug)]
pub struct UploadedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Resolves the format from `filename`.
    ///
    /// # Errors
    /// [`AdvisorError::InvalidRequest`] when the extension is not `.docx`/`.pdf`.
    ///
    /// # Example
    /// ```
    /// use advisor::UploadedDocument;
    /// assert!(UploadedDocument::new("q3.pdf", vec![]).is_ok());
    /// assert!(UploadedDocument::new("q3.xlsx", vec![]).is_err());
    /// ```
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AdvisorError> {
        let filename = filename.into();
        let format = DocumentFormat::from_path(&filename).ok_or_else(|| {
            AdvisorError::InvalidRequest(format!(
                "unsupported upload `{filename}`; expected .docx or .pdf"
            ))
        })?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }
}

/// One question to answer.
#[derive(Clone, Debug)]
pub struct AnswerRequest {
    pub question: String,
    pub analysis_kind: Option<AnalysisKind>,
    /// Whether the cached folder context goes into the prompt.
    pub include_document_context: bool,
    pub upload: Option<UploadedDocument>,
}

impl AnswerRequest {
    /// Generic question with document context and no upload.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            analysis_kind: None,
            include_document_context: true,
            upload: None,
        }
    }
}

/// Model answer plus metering.
#[derive(Clone, Debug, PartialEq)]
pub struct Answer {
    pub text: String,
    pub usage: Usage,
    pub model: String,
    /// Characters of folder context included in the prompt.
    pub context_chars: usize,
}
