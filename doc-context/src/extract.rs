//! Plain-text extraction for `.docx` and `.pdf`.
//!
//! Extraction works on in-memory bytes, so uploaded documents go through the
//! same code path as files read from the document folder. Malformed input is
//! an [`ExtractError`]; callers that must never fail use [`extract_or_empty`].

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, Run, RunChild, StructuredDataTag,
    StructuredDataTagChild, Table, TableCellContent, TableChild, TableRowChild,
};
use tracing::{debug, warn};

use crate::{errors::ExtractError, format::DocumentFormat};

/// Text of one document plus non-fatal notes from the extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub warnings: Vec<String>,
}

/// Extracts plain text from `bytes` interpreted as `format`.
///
/// # Errors
/// [`ExtractError::Malformed`] when the library rejects the bytes,
/// [`ExtractError::Crashed`] when it panics on them.
pub fn extract(format: DocumentFormat, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
    let out = match format {
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::Pdf => extract_pdf(bytes)?,
    };
    for w in &out.warnings {
        debug!(%format, warning = %w, "extractor warning");
    }
    Ok(out)
}

/// Reads `path` and extracts its text.
pub fn extract_file(path: &Path, format: DocumentFormat) -> Result<ExtractedText, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract(format, &bytes)
}

/// Like [`extract`], but reports failures through tracing and yields empty text.
pub fn extract_or_empty(name: &str, format: DocumentFormat, bytes: &[u8]) -> ExtractedText {
    match extract(format, bytes) {
        Ok(out) => out,
        Err(err) => {
            warn!(document = name, error = %err, "document extraction failed; using empty text");
            ExtractedText::default()
        }
    }
}

/* ---------------------------------- docx --------------------------------- */

fn extract_docx(bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
    let docx = guarded(DocumentFormat::Docx, || docx_rs::read_docx(bytes))?.map_err(|e| {
        ExtractError::Malformed {
            format: DocumentFormat::Docx,
            reason: e.to_string(),
        }
    })?;

    let mut blocks: Vec<String> = Vec::new();
    let mut skipped = 0usize;
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => push_block(&mut blocks, paragraph_text(p)),
            DocumentChild::Table(t) => push_block(&mut blocks, table_text(t)),
            DocumentChild::StructuredDataTag(tag) => collect_sdt_blocks(tag, &mut blocks),
            _ => skipped += 1,
        }
    }

    let mut warnings = Vec::new();
    if blocks.is_empty() {
        warnings.push("document contains no text paragraphs".to_string());
    }
    if skipped > 0 {
        debug!(skipped, "docx: ignored non-text body elements");
    }

    Ok(ExtractedText {
        text: blocks.join("\n"),
        warnings,
    })
}

fn push_block(blocks: &mut Vec<String>, text: String) {
    if !text.trim().is_empty() {
        blocks.push(text);
    }
}

fn paragraph_text(p: &Paragraph) -> String {
    let mut out = String::new();
    collect_paragraph_children(&p.children, &mut out);
    out
}

fn collect_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => collect_paragraph_children(&link.children, out),
            ParagraphChild::StructuredDataTag(tag) => {
                let mut inner = Vec::new();
                collect_sdt_blocks(tag, &mut inner);
                out.push_str(&inner.join(" "));
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Content controls (`w:sdt`) wrap ordinary runs, paragraphs and tables.
fn collect_sdt_blocks(tag: &StructuredDataTag, blocks: &mut Vec<String>) {
    let mut inline = String::new();
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, &mut inline),
            StructuredDataTagChild::Paragraph(p) => {
                push_block(blocks, std::mem::take(&mut inline));
                push_block(blocks, paragraph_text(p));
            }
            StructuredDataTagChild::Table(t) => {
                push_block(blocks, std::mem::take(&mut inline));
                push_block(blocks, table_text(t));
            }
            StructuredDataTagChild::StructuredDataTag(inner) => {
                push_block(blocks, std::mem::take(&mut inline));
                collect_sdt_blocks(inner, blocks);
            }
            _ => {}
        }
    }
    push_block(blocks, inline);
}

fn table_text(t: &Table) -> String {
    let mut rows = Vec::new();
    for row in &t.rows {
        let TableChild::TableRow(row) = row else {
            continue;
        };
        let mut cells = Vec::new();
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            let mut parts = Vec::new();
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => push_block(&mut parts, paragraph_text(p)),
                    TableCellContent::Table(inner) => push_block(&mut parts, table_text(inner)),
                    TableCellContent::StructuredDataTag(tag) => collect_sdt_blocks(tag, &mut parts),
                    _ => {}
                }
            }
            cells.push(parts.join(" "));
        }
        if cells.iter().any(|c| !c.trim().is_empty()) {
            rows.push(cells.join(" | "));
        }
    }
    rows.join("\n")
}

/* ---------------------------------- pdf ---------------------------------- */

fn extract_pdf(bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
    let raw = guarded(DocumentFormat::Pdf, || pdf_extract::extract_text_from_mem(bytes))?
        .map_err(|e| ExtractError::Malformed {
            format: DocumentFormat::Pdf,
            reason: e.to_string(),
        })?;

    let text = tidy_pdf_text(&raw);
    let mut warnings = Vec::new();
    if text.trim().is_empty() {
        warnings.push("pdf has no text layer".to_string());
    }
    Ok(ExtractedText { text, warnings })
}

/// Page breaks (form feeds) become paragraph breaks; trailing whitespace is
/// stripped from every line.
fn tidy_pdf_text(raw: &str) -> String {
    raw.replace('\u{0C}', "\n\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/* -------------------------------- helpers -------------------------------- */

/// Runs a third-party parser, turning a panic into [`ExtractError::Crashed`].
fn guarded<T>(format: DocumentFormat, f: impl FnOnce() -> T) -> Result<T, ExtractError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        ExtractError::Crashed { format, reason }
    })
}
