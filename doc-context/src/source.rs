//! Where the cache gets its documents from.
//!
//! [`DocumentSource`] is the seam between the cache (ordering, normalization,
//! change detection) and the filesystem/extractors, so the cache can be driven
//! by an in-memory source in tests.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{
    cache::FileFailure,
    errors::ExtractError,
    extract::{ExtractedText, extract_file},
    format::DocumentFormat,
    scan::scan_documents,
};

/// Extraction outcome of one document.
#[derive(Debug)]
pub struct SourcedDocument {
    /// `/`-separated path relative to the source root.
    pub relative: String,
    pub format: DocumentFormat,
    pub result: Result<ExtractedText, ExtractError>,
}

/// Everything one load produced.
#[derive(Debug, Default)]
pub struct SourceBatch {
    pub documents: Vec<SourcedDocument>,
    /// Locations that could not be listed at all.
    pub unreadable: Vec<FileFailure>,
}

impl From<Vec<SourcedDocument>> for SourceBatch {
    fn from(documents: Vec<SourcedDocument>) -> Self {
        Self {
            documents,
            unreadable: Vec::new(),
        }
    }
}

/// Blocking producer of extracted documents.
///
/// Called from the blocking thread pool; implementations may do file I/O and
/// CPU-heavy parsing. Per-document failures go into
/// [`SourcedDocument::result`], listing failures into
/// [`SourceBatch::unreadable`]; `load` itself never fails.
pub trait DocumentSource: Send + Sync + 'static {
    /// Human-readable location, shown in status snapshots.
    fn describe(&self) -> String;

    fn load(&self) -> SourceBatch;
}

/// Recursive `.docx`/`.pdf` folder.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSource for FsDocumentSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn load(&self) -> SourceBatch {
        let scan = scan_documents(&self.root);
        let documents = scan
            .files
            .into_iter()
            .map(|file| {
                let result = extract_file(&file.path, file.format);
                if let Err(e) = &result {
                    warn!(document = %file.relative, error = %e, "document skipped");
                }
                SourcedDocument {
                    relative: file.relative,
                    format: file.format,
                    result,
                }
            })
            .collect();
        SourceBatch {
            documents,
            unreadable: scan.unreadable,
        }
    }
}
