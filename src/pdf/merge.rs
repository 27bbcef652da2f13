//! Prepending the rendered TOC pages to the source document using lopdf

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Catalog entries carried from the source document into the output
const CARRIED_CATALOG_KEYS: [&[u8]; 3] = [b"Outlines", b"Names", b"Dests"];

/// Build a document holding every TOC page followed by every source page
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// Source pages are reused as-is; only their `/Parent` changes. The source
/// outline and named destinations are kept, and since they reference page
/// objects rather than indices they still land on the right pages.
pub fn prepend_pages(toc_bytes: &[u8], source: Document) -> Result<Document> {
    let toc = Document::load_mem(toc_bytes)?;

    if source.get_pages().is_empty() {
        return Err(Error::General("Source document has no pages".to_string()));
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut carried_catalog = Dictionary::new();

    for (is_source, mut doc) in [(false, toc), (true, source)] {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page_id in &pages {
            inherit_page_attributes(&mut doc, page_id)?;
        }

        if is_source {
            let catalog = doc.catalog()?;
            for key in CARRIED_CATALOG_KEYS {
                if let Ok(value) = catalog.get(key) {
                    carried_catalog.set(key.to_vec(), value.clone());
                }
            }
        }

        page_ids.extend(pages);
        objects.extend(doc.objects);
    }

    let mut merged_doc = Document::with_version("1.5");
    merged_doc.objects.extend(objects);
    // new_object_id() must hand out ids above everything just inserted
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = carried_catalog;
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    // Drops the old catalogs, page tree nodes and the TOC's Info dictionary
    let pruned = merged_doc.prune_objects();
    log::debug!(
        "Assembled {} pages, pruned {} unreachable objects",
        page_ids.len(),
        pruned.len()
    );

    Ok(merged_doc)
}

/// Copy inherited page attributes onto the page itself
///
/// The merged page tree is flat, so anything a page picked up from an
/// intermediate `/Pages` node would otherwise be lost.
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        let mut missing: Vec<&[u8]> = INHERITABLE_PAGE_KEYS
            .into_iter()
            .filter(|key| !page.has(key))
            .collect();

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let (Some(parent_id), false) = (parent, missing.is_empty()) {
            depth += 1;
            if depth > 64 {
                return Err(Error::General("Page tree is too deep or cyclic".to_string()));
            }
            let node = doc.get_dictionary(parent_id)?;
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((*key, value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
    }

    if !inherited.is_empty() {
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }
    }

    Ok(())
}

/// Save a document to `output_path`, replacing any existing file
///
/// The file handle is flushed explicitly so a failed final write is reported
/// instead of being swallowed when the writer is dropped.
pub fn write_document(doc: &mut Document, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    doc.compress();
    doc.save_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
