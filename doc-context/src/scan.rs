//! Recursive document folder scanner.
//!
//! Produces the list of supported documents under a root, in a deterministic
//! order: by relative parent directory, then by file name. Office lock/temp
//! files are skipped. Entries the walk cannot read are logged and returned
//! next to the files, so a reload can report them.

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::{cache::FileFailure, format::DocumentFormat};

/// Name prefixes of editor lock/temp files (`~$Report.docx`, `.~lock.a.docx#`).
pub const TEMP_FILE_MARKERS: &[&str] = &["~", ".~lock"];

/// One supported document found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated on every platform.
    pub relative: String,
    pub format: DocumentFormat,
}

/// Outcome of one folder walk.
#[derive(Debug, Default)]
pub struct FolderScan {
    pub files: Vec<ScannedFile>,
    /// Folders or entries that could not be read (permissions, link loops).
    pub unreadable: Vec<FileFailure>,
}

/// Returns `true` for names that editors use for lock/temp files.
pub fn is_temp_file(name: &str) -> bool {
    TEMP_FILE_MARKERS.iter().any(|m| name.starts_with(m))
}

/// Lists supported documents under `root`, sorted deterministically.
///
/// A missing root yields an empty scan. Unreadable entries below it end up
/// in [`FolderScan::unreadable`].
pub fn scan_documents(root: &Path) -> FolderScan {
    if !root.is_dir() {
        debug!(root = %root.display(), "document folder does not exist");
        return FolderScan::default();
    }

    let mut keyed: Vec<((String, String), ScannedFile)> = Vec::new();
    let mut unreadable = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| slash_path(p.strip_prefix(root).unwrap_or(p)))
                    .unwrap_or_else(|| root.display().to_string());
                warn!(%path, error = %e, "cannot read folder entry");
                unreadable.push(FileFailure {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_temp_file(&name) {
            trace!(file = %name, "skipping temp file");
            continue;
        }
        let Some(format) = DocumentFormat::from_path(entry.path()) else {
            continue;
        };

        let rel_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = slash_path(rel_path);

        keyed.push((
            order_key(&relative),
            ScannedFile {
                path: entry.path().to_path_buf(),
                relative,
                format,
            },
        ));
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(
        root = %root.display(),
        files = keyed.len(),
        unreadable = unreadable.len(),
        "document folder scanned"
    );
    FolderScan {
        files: keyed.into_iter().map(|(_, f)| f).collect(),
        unreadable,
    }
}

/// Sort key of a `/`-separated relative path: (parent directory, file name).
pub fn order_key(relative: &str) -> (String, String) {
    match relative.rsplit_once('/') {
        Some((parent, name)) => (parent.to_string(), name.to_string()),
        None => (String::new(), relative.to_string()),
    }
}

fn slash_path(p: &Path) -> String {
    p.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
