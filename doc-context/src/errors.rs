//! Typed errors for document extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::DocumentFormat;

/// Why a single document contributed no text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File could not be read from disk.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes are not a valid document of the declared format.
    #[error("malformed {format} document: {reason}")]
    Malformed {
        format: DocumentFormat,
        reason: String,
    },

    /// The extraction library panicked on this input.
    #[error("{format} extractor crashed: {reason}")]
    Crashed {
        format: DocumentFormat,
        reason: String,
    },
}
