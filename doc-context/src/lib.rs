//! Document context for the chat backend.
//!
//! Scans a folder of `.docx`/`.pdf` files, extracts and normalizes their text
//! into one blob, and keeps it cached with a TTL and fingerprint-based change
//! detection. The same extractor serves per-request uploads.
//!
//! ```no_run
//! # async fn demo() {
//! use doc_context::DocContextConfig;
//!
//! let cache = DocContextConfig::from_env().build_cache();
//! let text = cache.get_content().await;
//! println!("{} chars of context", text.len());
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fingerprint;
pub mod format;
pub mod normalize;
pub mod scan;
pub mod source;

pub use cache::{CacheStatus, DEFAULT_TTL, DocumentContextCache, FileFailure, ReloadReport};
pub use config::DocContextConfig;
pub use errors::ExtractError;
pub use extract::{ExtractedText, extract, extract_or_empty};
pub use format::DocumentFormat;
pub use source::{DocumentSource, FsDocumentSource, SourceBatch, SourcedDocument};
