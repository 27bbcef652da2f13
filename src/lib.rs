//! PDF TOC Library
//!
//! Builds a table of contents from a PDF's bookmarks and prepends it to the
//! document. This library provides functionality to:
//! - Read and flatten the outline (bookmark) tree
//! - Lay out TOC lines with dot leaders and shifted page numbers
//! - Render the TOC pages with the standard Helvetica fonts
//! - Prepend the TOC pages to the source document
//!
//! # Example
//!
//! ```no_run
//! use pdf_toc::pipeline::{generate_pdf_with_toc, TocRequest};
//!
//! let request = TocRequest::new("manual.pdf", "manual-with-toc.pdf");
//! generate_pdf_with_toc(&request).expect("Failed to add TOC");
//! ```

pub mod error;
pub mod layout;
pub mod pdf;
pub mod pipeline;

// Re-export commonly used items
pub use error::{Error, Result};
pub use pipeline::{generate_pdf_with_toc, TocReport, TocRequest};
