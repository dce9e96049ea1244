//! Environment configuration of the document cache.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::{DEFAULT_TTL, DocumentContextCache},
    source::FsDocumentSource,
};

/// Where documents live and how long their text stays cached.
#[derive(Debug, Clone, PartialEq)]
pub struct DocContextConfig {
    pub docs_dir: PathBuf,
    pub ttl: Duration,
}

impl Default for DocContextConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("documents"),
            ttl: DEFAULT_TTL,
        }
    }
}

impl DocContextConfig {
    /// Reads `DOCS_DIR` and `DOCS_CACHE_TTL_SECS`; unset or unparsable values
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        let dflt = Self::default();
        Self {
            docs_dir: std::env::var("DOCS_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(dflt.docs_dir),
            ttl: Duration::from_secs(parse("DOCS_CACHE_TTL_SECS", dflt.ttl.as_secs())),
        }
    }

    /// Cache over the configured folder.
    pub fn build_cache(&self) -> DocumentContextCache {
        DocumentContextCache::new(Arc::new(FsDocumentSource::new(&self.docs_dir)), self.ttl)
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
