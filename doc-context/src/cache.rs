//! TTL cache of the combined, normalized document text.
//!
//! The cache owns one [`DocumentSource`] and exposes its contents as a single
//! `Arc<str>`. A reload runs when the cached value is older than the TTL (or
//! was never loaded) and on explicit [`DocumentContextCache::force_refresh`].
//!
//! Guarantees:
//! - text and fingerprint are swapped together, only when the fingerprint of
//!   the freshly normalized text differs from the stored one;
//! - the load timestamp, reload counter and last report are updated on every
//!   reload attempt, successful or not;
//! - reloads are single-flight: concurrent callers that find the cache stale
//!   wait for the running reload and then re-check freshness.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    fingerprint::{fingerprint, short},
    normalize::{collapse_whitespace, mask_volatile},
    scan::order_key,
    source::{DocumentSource, SourceBatch},
};

/// Default time-to-live of the cached text.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// One document that contributed no text because extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

/// Summary of one reload attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadReport {
    pub files_seen: usize,
    /// Files that produced non-empty text.
    pub files_extracted: usize,
    /// Files that were read fine but had no text.
    pub files_empty: usize,
    pub failures: Vec<FileFailure>,
    /// Whether the stored text was replaced.
    pub changed: bool,
    pub fingerprint: Option<String>,
    pub chars: usize,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Point-in-time view of the cache, for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub source: String,
    pub ttl_secs: u64,
    pub fingerprint: Option<String>,
    pub chars: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub stale: bool,
    pub reload_count: u64,
    pub last_report: Option<ReloadReport>,
}

#[derive(Debug)]
struct CacheState {
    text: Arc<str>,
    fingerprint: Option<String>,
    loaded_at: Option<Instant>,
    loaded_at_utc: Option<DateTime<Utc>>,
    last_report: Option<ReloadReport>,
}

impl CacheState {
    fn empty() -> Self {
        Self {
            text: Arc::from(""),
            fingerprint: None,
            loaded_at: None,
            loaded_at_utc: None,
            last_report: None,
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.loaded_at.is_some_and(|at| at.elapsed() <= ttl)
    }
}

/// Concatenation of a batch; bodies are masked, whitespace not yet collapsed.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Combined {
    pub raw: String,
    pub files_seen: usize,
    pub files_extracted: usize,
    pub files_empty: usize,
    pub failures: Vec<FileFailure>,
}

/// Orders a batch by (parent directory, file name) and concatenates the
/// masked text of every successful document behind a delimiter line.
pub(crate) fn combine(batch: SourceBatch) -> Combined {
    let mut docs = batch.documents;
    docs.sort_by_cached_key(|d| order_key(&d.relative));

    let mut out = Combined {
        files_seen: docs.len(),
        ..Combined::default()
    };
    for doc in docs {
        match doc.result {
            Ok(extracted) => {
                let text = extracted.text.trim();
                if text.is_empty() {
                    out.files_empty += 1;
                    continue;
                }
                out.files_extracted += 1;
                out.raw.push_str("--- Document: ");
                out.raw.push_str(&doc.relative);
                out.raw.push_str(" ---\n");
                out.raw.push_str(&mask_volatile(text));
                out.raw.push_str("\n\n");
            }
            Err(e) => out.failures.push(FileFailure {
                path: doc.relative,
                reason: e.to_string(),
            }),
        }
    }
    out.failures.extend(batch.unreadable);
    out
}

/// Shared, lazily refreshed document context.
pub struct DocumentContextCache {
    source: Arc<dyn DocumentSource>,
    ttl: Duration,
    state: RwLock<CacheState>,
    reload_lock: Mutex<()>,
    reloads: AtomicU64,
}

impl std::fmt::Debug for DocumentContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentContextCache")
            .field("source", &self.source.describe())
            .field("ttl", &self.ttl)
            .field("reloads", &self.reload_count())
            .finish()
    }
}

impl DocumentContextCache {
    pub fn new(source: Arc<dyn DocumentSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: RwLock::new(CacheState::empty()),
            reload_lock: Mutex::new(()),
            reloads: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of reload attempts so far.
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Current context text, reloading first if never loaded or older than
    /// the TTL. Never fails; an empty folder yields an empty string.
    pub async fn get_content(&self) -> Arc<str> {
        if let Some(text) = self.fresh_text().await {
            return text;
        }

        let _guard = self.reload_lock.lock().await;
        // Another caller may have reloaded while we waited.
        if let Some(text) = self.fresh_text().await {
            return text;
        }
        self.reload_locked().await;
        Arc::clone(&self.state.read().await.text)
    }

    /// Reloads regardless of age and returns the report.
    pub async fn force_refresh(&self) -> ReloadReport {
        let _guard = self.reload_lock.lock().await;
        self.reload_locked().await
    }

    pub async fn status(&self) -> CacheStatus {
        let st = self.state.read().await;
        CacheStatus {
            source: self.source.describe(),
            ttl_secs: self.ttl.as_secs(),
            fingerprint: st.fingerprint.clone(),
            chars: st.text.chars().count(),
            loaded_at: st.loaded_at_utc,
            stale: !st.is_fresh(self.ttl),
            reload_count: self.reload_count(),
            last_report: st.last_report.clone(),
        }
    }

    async fn fresh_text(&self) -> Option<Arc<str>> {
        let st = self.state.read().await;
        st.is_fresh(self.ttl).then(|| Arc::clone(&st.text))
    }

    /// Caller must hold `reload_lock`.
    async fn reload_locked(&self) -> ReloadReport {
        let started = Instant::now();
        let source = Arc::clone(&self.source);

        let combined = match tokio::task::spawn_blocking(move || combine(source.load())).await {
            Ok(c) => Some(c),
            Err(e) => {
                error!(source = %self.source.describe(), error = %e, "document load task failed");
                None
            }
        };

        let mut st = self.state.write().await;
        let report = match combined {
            Some(combined) => {
                let normalized = collapse_whitespace(&combined.raw);
                let fp = fingerprint(&normalized);
                let changed = st.fingerprint.as_deref() != Some(fp.as_str());
                if changed {
                    st.text = Arc::from(normalized);
                    st.fingerprint = Some(fp);
                }
                for f in &combined.failures {
                    warn!(document = %f.path, reason = %f.reason, "document contributed no text");
                }
                ReloadReport {
                    files_seen: combined.files_seen,
                    files_extracted: combined.files_extracted,
                    files_empty: combined.files_empty,
                    failures: combined.failures,
                    changed,
                    fingerprint: st.fingerprint.clone(),
                    chars: st.text.chars().count(),
                    finished_at: Utc::now(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }
            }
            None => ReloadReport {
                files_seen: 0,
                files_extracted: 0,
                files_empty: 0,
                failures: vec![FileFailure {
                    path: self.source.describe(),
                    reason: "document load task failed".to_string(),
                }],
                changed: false,
                fingerprint: st.fingerprint.clone(),
                chars: st.text.chars().count(),
                finished_at: Utc::now(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
        };

        st.loaded_at = Some(Instant::now());
        st.loaded_at_utc = Some(report.finished_at);
        st.last_report = Some(report.clone());
        let n = self.reloads.fetch_add(1, Ordering::Relaxed) + 1;

        if report.changed {
            info!(
                reload = n,
                files = report.files_seen,
                extracted = report.files_extracted,
                failed = report.failures.len(),
                chars = report.chars,
                fingerprint = report.fingerprint.as_deref().map(short).unwrap_or("-"),
                elapsed_ms = report.elapsed_ms,
                "document context reloaded"
            );
        } else {
            debug!(
                reload = n,
                files = report.files_seen,
                failed = report.failures.len(),
                "document context unchanged"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExtractError;
    use crate::extract::ExtractedText;
    use crate::format::DocumentFormat;
    use crate::source::SourcedDocument;
    use std::sync::Mutex as StdMutex;

    /// In-memory source whose documents can be swapped between reloads.
    #[derive(Default)]
    struct FakeSource {
        docs: StdMutex<Vec<(String, Option<String>)>>,
    }

    impl FakeSource {
        fn with(docs: &[(&str, Option<&str>)]) -> Arc<Self> {
            let src = Arc::new(Self::default());
            src.set(docs);
            src
        }

        fn set(&self, docs: &[(&str, Option<&str>)]) {
            *self.docs.lock().unwrap() = docs
                .iter()
                .map(|(p, t)| (p.to_string(), t.map(str::to_string)))
                .collect();
        }
    }

    impl DocumentSource for FakeSource {
        fn describe(&self) -> String {
            "memory".into()
        }

        fn load(&self) -> SourceBatch {
            self.docs
                .lock()
                .unwrap()
                .iter()
                .map(|(path, text)| {
                    let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Docx);
                    let result = match text {
                        Some(t) => Ok(ExtractedText {
                            text: t.clone(),
                            warnings: vec![],
                        }),
                        None => Err(ExtractError::Malformed {
                            format,
                            reason: "corrupt".into(),
                        }),
                    };
                    SourcedDocument {
                        relative: path.clone(),
                        format,
                        result,
                    }
                })
                .collect::<Vec<_>>()
                .into()
        }
    }

    fn cache(src: Arc<FakeSource>, ttl: Duration) -> DocumentContextCache {
        DocumentContextCache::new(src, ttl)
    }

    #[tokio::test]
    async fn reload_of_unchanged_input_is_idempotent() {
        let src = FakeSource::with(&[("A.docx", Some("Alpha")), ("B.pdf", Some("Beta"))]);
        let c = cache(src, DEFAULT_TTL);

        let first = c.force_refresh().await;
        let text1 = c.get_content().await;
        let second = c.force_refresh().await;
        let text2 = c.get_content().await;

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(text1, text2);
        assert_eq!(c.reload_count(), 2);
        assert!(c.status().await.loaded_at.is_some());
    }

    #[tokio::test]
    async fn real_change_updates_fingerprint_but_generated_date_does_not() {
        let src = FakeSource::with(&[("A.docx", Some("Limit 100\nGenerated on 2024-01-01 10:00"))]);
        let c = cache(Arc::clone(&src), DEFAULT_TTL);
        let base = c.force_refresh().await.fingerprint;

        src.set(&[("A.docx", Some("Limit 100\nGenerated on 2024-02-15 17:42"))]);
        let after_footer = c.force_refresh().await;
        assert!(!after_footer.changed);
        assert_eq!(after_footer.fingerprint, base);

        src.set(&[("A.docx", Some("Limit 200\nGenerated on 2024-02-15 17:42"))]);
        let after_edit = c.force_refresh().await;
        assert!(after_edit.changed);
        assert_ne!(after_edit.fingerprint, base);
        assert!(c.get_content().await.contains("Limit 200"));
    }

    #[tokio::test]
    async fn prose_and_ratio_edits_are_detected() {
        let src = FakeSource::with(&[(
            "policy.docx",
            Some("Interest generated on savings is credited monthly at 2.1% p.a.\nDebt to equity must stay below 60:40 for approval."),
        )]);
        let c = cache(Arc::clone(&src), DEFAULT_TTL);
        let base = c.force_refresh().await.fingerprint;
        assert!(c.get_content().await.contains("credited monthly at 2.1% p.a."));

        src.set(&[(
            "policy.docx",
            Some("Interest generated on savings is credited monthly at 3.5% p.a.\nDebt to equity must stay below 60:40 for approval."),
        )]);
        let rate = c.force_refresh().await;
        assert!(rate.changed);
        assert_ne!(rate.fingerprint, base);

        src.set(&[(
            "policy.docx",
            Some("Interest generated on savings is credited monthly at 3.5% p.a.\nDebt to equity must stay below 70:30 for approval."),
        )]);
        let ratio = c.force_refresh().await;
        assert!(ratio.changed);
        assert!(c.get_content().await.contains("below 70:30 for approval"));
    }

    #[tokio::test]
    async fn dates_in_file_names_are_not_masked() {
        let src = FakeSource::with(&[
            ("statements/2024-03-31.pdf", Some("Q1 totals")),
            ("statements/2024-06-30.pdf", Some("Q2 totals")),
        ]);
        let c = cache(src, DEFAULT_TTL);

        assert_eq!(
            &*c.get_content().await,
            "--- Document: statements/2024-03-31.pdf --- Q1 totals \
             --- Document: statements/2024-06-30.pdf --- Q2 totals"
        );
    }

    #[test]
    fn unreadable_locations_become_failures() {
        let batch = SourceBatch {
            documents: vec![SourcedDocument {
                relative: "A.docx".into(),
                format: DocumentFormat::Docx,
                result: Ok(ExtractedText {
                    text: "alpha".into(),
                    warnings: vec![],
                }),
            }],
            unreadable: vec![FileFailure {
                path: "locked".into(),
                reason: "permission denied".into(),
            }],
        };

        let combined = combine(batch);
        assert_eq!(combined.files_seen, 1);
        assert_eq!(combined.files_extracted, 1);
        assert_eq!(combined.failures.len(), 1);
        assert_eq!(combined.failures[0].path, "locked");
    }

    #[tokio::test]
    async fn documents_are_concatenated_in_sorted_order() {
        let src = FakeSource::with(&[
            ("C.docx", Some("gamma")),
            ("sub/A.docx", Some("nested")),
            ("A.docx", Some("alpha")),
            ("B.pdf", Some("beta")),
        ]);
        let c = cache(src, DEFAULT_TTL);

        assert_eq!(
            &*c.get_content().await,
            "--- Document: A.docx --- alpha --- Document: B.pdf --- beta \
             --- Document: C.docx --- gamma --- Document: sub/A.docx --- nested"
        );
    }

    #[tokio::test]
    async fn one_corrupt_file_does_not_abort_the_batch() {
        let src = FakeSource::with(&[
            ("A.docx", Some("alpha")),
            ("B.pdf", None),
            ("C.docx", Some("gamma")),
        ]);
        let c = cache(src, DEFAULT_TTL);

        let report = c.force_refresh().await;
        assert_eq!(report.files_seen, 3);
        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "B.pdf");

        let text = c.get_content().await;
        assert!(text.contains("alpha") && text.contains("gamma"));
        assert!(!text.contains("B.pdf"));
    }

    #[tokio::test]
    async fn empty_source_yields_empty_text() {
        let c = cache(FakeSource::with(&[("blank.docx", Some("  \n "))]), DEFAULT_TTL);
        assert_eq!(&*c.get_content().await, "");
        let status = c.status().await;
        assert_eq!(status.chars, 0);
        assert_eq!(status.last_report.map(|r| r.files_empty), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn reloads_only_after_ttl_elapses() {
        let c = cache(FakeSource::with(&[("A.docx", Some("alpha"))]), Duration::from_secs(60));

        c.get_content().await;
        c.get_content().await;
        assert_eq!(c.reload_count(), 1);

        tokio::time::advance(Duration::from_secs(59)).await;
        c.get_content().await;
        assert_eq!(c.reload_count(), 1);
        assert!(!c.status().await.stale);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(c.status().await.stale);
        c.get_content().await;
        assert_eq!(c.reload_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_stale_readers_share_one_reload() {
        let c = Arc::new(cache(FakeSource::with(&[("A.docx", Some("alpha"))]), DEFAULT_TTL));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                tokio::spawn(async move { c.get_content().await })
            })
            .collect();
        for h in handles {
            assert!(h.await.unwrap().contains("alpha"));
        }
        assert_eq!(c.reload_count(), 1);
    }
}
