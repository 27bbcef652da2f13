//! Loading source documents and reading their basic properties

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};
use crate::pdf::outline::decode_pdf_string;

/// Source PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Load a PDF, rejecting missing files and documents without pages
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;

    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(doc)
}

/// Read a text entry from the document's Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    match info.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

/// Metadata of an already loaded document
pub fn document_metadata(doc: &Document) -> PdfMetadata {
    PdfMetadata {
        page_count: doc.get_pages().len(),
        title: info_string(doc, b"Title"),
        author: info_string(doc, b"Author"),
    }
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    Ok(load_document(path)?.get_pages().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Dictionary, StringFormat};

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_load_document_nonexistent_file() {
        let result = load_document(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_info_strings() {
        let mut doc = Document::with_version("1.5");
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(0));
        pages.set("Kids", Object::Array(vec![]));
        let pages_id = doc.add_object(Object::Dictionary(pages));
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = Dictionary::new();
        info.set("Title", Object::String(b"Handbook".to_vec(), StringFormat::Literal));
        info.set("Author", Object::String(b"R\x90s Press".to_vec(), StringFormat::Literal));
        info.set("Subject", Object::Integer(3));
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));

        let metadata = document_metadata(&doc);
        assert_eq!(metadata.page_count, 0);
        assert_eq!(metadata.title.as_deref(), Some("Handbook"));
        assert_eq!(metadata.author.as_deref(), Some("R\u{2019}s Press"));
        assert_eq!(info_string(&doc, b"Subject"), None);
    }

    #[test]
    fn test_unparseable_file_is_pdf_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(matches!(load_document(&path), Err(Error::Pdf(_))));
    }
}
