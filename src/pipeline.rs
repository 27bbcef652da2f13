//! End-to-end TOC generation: source PDF in, source PDF with TOC pages out

use std::path::{Path, PathBuf};
use log::info;
use crate::error::Result;
use crate::pdf::merge::{prepend_pages, write_document};
use crate::pdf::metadata::load_document;
use crate::pdf::outline::extract_bookmarks;
use crate::pdf::toc::{build_toc, TocOptions};

/// One "generate" action: which file to read, where to write, how to render
#[derive(Debug, Clone)]
pub struct TocRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub options: TocOptions,
}

impl TocRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            options: TocOptions::default(),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocReport {
    /// Bookmarks found in the source outline
    pub bookmark_count: usize,
    /// Lines printed in the TOC
    pub entry_count: usize,
    /// Pages the TOC occupies
    pub toc_pages: usize,
    /// Page offset used for the printed labels
    pub page_offset: usize,
    pub source_pages: usize,
    pub total_pages: usize,
}

/// Append `.pdf` when the output path has no extension
pub fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("pdf")
    }
}

/// Read bookmarks, render the TOC, prepend it and write the result
///
/// Nothing is reported as done unless the output was written completely.
///
/// # Example
///
/// ```no_run
/// use pdf_toc::pipeline::{generate_pdf_with_toc, TocRequest};
///
/// let report = generate_pdf_with_toc(&TocRequest::new("book.pdf", "book-with-toc.pdf"))
///     .expect("Failed to generate TOC");
/// println!("{} TOC pages", report.toc_pages);
/// ```
pub fn generate_pdf_with_toc(request: &TocRequest) -> Result<TocReport> {
    let source = load_document(&request.input_path)?;
    let source_pages = source.get_pages().len();

    let bookmarks = extract_bookmarks(&source)?;
    info!(
        "Read {} bookmarks from {} ({} pages)",
        bookmarks.len(),
        request.input_path.display(),
        source_pages
    );

    let toc = build_toc(&bookmarks, &request.options)?;
    info!(
        "Rendered {} TOC entries on {} pages (page offset {})",
        toc.entry_count, toc.page_count, toc.page_offset
    );

    let mut merged = prepend_pages(&toc.bytes, source)?;
    let total_pages = merged.get_pages().len();
    write_document(&mut merged, &request.output_path)?;
    info!("Wrote {} pages to {}", total_pages, request.output_path.display());

    Ok(TocReport {
        bookmark_count: bookmarks.len(),
        entry_count: toc.entry_count,
        toc_pages: toc.page_count,
        page_offset: toc.page_offset,
        source_pages,
        total_pages,
    })
}
