//! Supported document formats, resolved from file extensions.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Closed set of formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Office Open XML word-processing document (`.docx`).
    Docx,
    /// Portable Document Format (`.pdf`).
    Pdf,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Docx, DocumentFormat::Pdf];

    /// Canonical lowercase extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// Resolves a format from an extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Resolves a format from a path or bare filename.
    ///
    /// ```
    /// use doc_context::DocumentFormat;
    /// assert_eq!(DocumentFormat::from_path("Q3/Report.PDF"), Some(DocumentFormat::Pdf));
    /// assert_eq!(DocumentFormat::from_path("notes.txt"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
