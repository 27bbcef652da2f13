//! PDF manipulation module

pub mod canvas;
pub mod fonts;
pub mod merge;
pub mod metadata;
pub mod outline;
pub mod toc;

// Re-export commonly used items
pub use merge::{prepend_pages, write_document};
pub use metadata::{count_pages, document_metadata, load_document, PdfMetadata};
pub use outline::{extract_bookmarks, flatten_outline, sort_by_page, Bookmark, OutlineNode};
pub use toc::{build_toc, render_toc, OffsetStrategy, RenderedToc, TocOptions};
