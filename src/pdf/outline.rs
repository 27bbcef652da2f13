//! Bookmark (outline) extraction and flattening
//!
//! The outline is read into a nested sequence where an entry with children is
//! followed by a [`OutlineNode::Children`] node holding them. Flattening walks
//! that sequence depth-first and resolves every entry to a zero-based page.

use std::collections::{HashMap, HashSet};
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Upper bound on `Reference -> Reference -> ...` chains and named-destination hops
const MAX_INDIRECTION: usize = 32;

/// Where an outline entry points
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// Page object reference, the usual `[page /XYZ ...]` form
    Page(ObjectId),
    /// Zero-based page index, written by some generators instead of a reference
    PageIndex(u32),
    /// Named destination looked up in the document's name tree
    Named(Vec<u8>),
    /// No GoTo target (URI actions, empty entries)
    Missing,
}

/// A single outline entry as read from the document
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub title: String,
    pub destination: Destination,
}

/// Node of the outline tree
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineNode {
    Entry(OutlineEntry),
    /// Children of the entry immediately preceding this node
    Children(Vec<OutlineNode>),
}

/// Flattened bookmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Nesting level, 0 for top-level entries
    pub depth: usize,
    pub title: String,
    /// Zero-based page index in the source document
    pub page: u32,
}

/// Maps an outline entry to the zero-based index of the page it targets
pub trait PageResolver {
    fn resolve(&self, entry: &OutlineEntry) -> Result<u32>;
}

impl<F> PageResolver for F
where
    F: Fn(&OutlineEntry) -> Result<u32>,
{
    fn resolve(&self, entry: &OutlineEntry) -> Result<u32> {
        self(entry)
    }
}

/// Resolves destinations against a loaded document
pub struct DocumentResolver<'a> {
    doc: &'a Document,
    page_indices: HashMap<ObjectId, u32>,
    page_count: u32,
}

impl<'a> DocumentResolver<'a> {
    pub fn new(doc: &'a Document) -> Self {
        let pages = doc.get_pages();
        let page_count = pages.len() as u32;
        // get_pages numbers from 1
        let page_indices = pages
            .into_iter()
            .map(|(number, id)| (id, number - 1))
            .collect();

        Self {
            doc,
            page_indices,
            page_count,
        }
    }

    fn resolve_destination(&self, destination: &Destination, hops: usize) -> Option<u32> {
        match destination {
            Destination::Page(id) => self.page_indices.get(id).copied(),
            Destination::PageIndex(index) if *index < self.page_count => Some(*index),
            Destination::PageIndex(_) => None,
            Destination::Named(name) if hops < MAX_INDIRECTION => {
                let target = lookup_named_destination(self.doc, name)?;
                let destination = parse_destination(self.doc, target).ok()?;
                self.resolve_destination(&destination, hops + 1)
            }
            Destination::Named(_) | Destination::Missing => None,
        }
    }
}

impl PageResolver for DocumentResolver<'_> {
    fn resolve(&self, entry: &OutlineEntry) -> Result<u32> {
        self.resolve_destination(&entry.destination, 0)
            .ok_or_else(|| Error::UnresolvedDestination(entry.title.clone()))
    }
}

/// Read the document outline into a nested node sequence
///
/// A document without `/Outlines` yields an empty sequence.
pub fn read_outline(doc: &Document) -> Result<Vec<OutlineNode>> {
    let catalog = doc.catalog()?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(object) => deref(doc, object)?,
        Err(_) => return Ok(Vec::new()),
    };
    let outlines = match outlines {
        Object::Dictionary(dict) => dict,
        Object::Null => return Ok(Vec::new()),
        _ => return Err(Error::InvalidOutline("/Outlines is not a dictionary".to_string())),
    };

    let mut visited = HashSet::new();
    match outlines.get(b"First") {
        Ok(Object::Reference(first)) => read_siblings(doc, *first, &mut visited),
        _ => Ok(Vec::new()),
    }
}

fn read_siblings(
    doc: &Document,
    first: ObjectId,
    visited: &mut HashSet<ObjectId>,
) -> Result<Vec<OutlineNode>> {
    let mut nodes = Vec::new();
    let mut current = Some(first);

    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(Error::InvalidOutline(format!(
                "outline item {} {} R is reachable twice",
                id.0, id.1
            )));
        }

        let item = doc.get_dictionary(id)?;

        let title = match item.get(b"Title") {
            Ok(object) => match deref(doc, object)? {
                Object::String(bytes, _) => decode_pdf_string(bytes),
                _ => String::new(),
            },
            Err(_) => String::new(),
        };
        let destination = entry_destination(doc, item)?;
        nodes.push(OutlineNode::Entry(OutlineEntry { title, destination }));

        if let Ok(Object::Reference(child)) = item.get(b"First") {
            let children = read_siblings(doc, *child, visited)?;
            if !children.is_empty() {
                nodes.push(OutlineNode::Children(children));
            }
        }

        current = match item.get(b"Next") {
            Ok(Object::Reference(next)) => Some(*next),
            _ => None,
        };
    }

    Ok(nodes)
}

/// Destination of an outline item, from `/Dest` or a `/GoTo` action
fn entry_destination(doc: &Document, item: &Dictionary) -> Result<Destination> {
    if let Ok(dest) = item.get(b"Dest") {
        return parse_destination(doc, dest);
    }

    if let Ok(action) = item.get(b"A") {
        if let Object::Dictionary(action) = deref(doc, action)? {
            let is_goto = matches!(action.get(b"S"), Ok(Object::Name(kind)) if kind == b"GoTo");
            if is_goto {
                if let Ok(dest) = action.get(b"D") {
                    return parse_destination(doc, dest);
                }
            }
        }
    }

    Ok(Destination::Missing)
}

fn parse_destination(doc: &Document, dest: &Object) -> Result<Destination> {
    let destination = match deref(doc, dest)? {
        Object::Array(items) => match items.first() {
            Some(Object::Reference(page)) => Destination::Page(*page),
            Some(Object::Integer(index)) => match u32::try_from(*index) {
                Ok(index) => Destination::PageIndex(index),
                Err(_) => Destination::Missing,
            },
            _ => Destination::Missing,
        },
        Object::String(name, _) | Object::Name(name) => Destination::Named(name.clone()),
        // Named destination values may be wrapped as << /D [...] >>
        Object::Dictionary(dict) => match dict.get(b"D") {
            Ok(inner) => parse_destination(doc, inner)?,
            Err(_) => Destination::Missing,
        },
        _ => Destination::Missing,
    };
    Ok(destination)
}

/// Find a named destination in `/Names /Dests` or the legacy catalog `/Dests`
fn lookup_named_destination<'a>(doc: &'a Document, name: &[u8]) -> Option<&'a Object> {
    let catalog = doc.catalog().ok()?;

    if let Ok(names) = catalog.get(b"Names") {
        if let Ok(Object::Dictionary(names)) = deref(doc, names) {
            if let Ok(dests) = names.get(b"Dests") {
                let mut visited = HashSet::new();
                if let Some(found) = search_name_tree(doc, dests, name, &mut visited) {
                    return Some(found);
                }
            }
        }
    }

    if let Ok(dests) = catalog.get(b"Dests") {
        if let Ok(Object::Dictionary(dests)) = deref(doc, dests) {
            return dests.get(name).ok();
        }
    }

    None
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node: &'a Object,
    name: &[u8],
    visited: &mut HashSet<ObjectId>,
) -> Option<&'a Object> {
    if let Object::Reference(id) = node {
        if !visited.insert(*id) {
            return None;
        }
    }
    let dict = match deref(doc, node) {
        Ok(Object::Dictionary(dict)) => dict,
        _ => return None,
    };

    if let Some(Object::Array(names)) = dict.get(b"Names").ok().and_then(|o| deref(doc, o).ok()) {
        for pair in names.chunks_exact(2) {
            if let Ok(Object::String(key, _)) = deref(doc, &pair[0]) {
                if key.as_slice() == name {
                    return Some(&pair[1]);
                }
            }
        }
    }

    if let Some(Object::Array(kids)) = dict.get(b"Kids").ok().and_then(|o| deref(doc, o).ok()) {
        for kid in kids {
            if let Some(found) = search_name_tree(doc, kid, name, visited) {
                return Some(found);
            }
        }
    }

    None
}

/// Follow indirect references until a direct object is reached
fn deref<'a>(doc: &'a Document, mut object: &'a Object) -> Result<&'a Object> {
    for _ in 0..MAX_INDIRECTION {
        match object {
            Object::Reference(id) => object = doc.get_object(*id)?,
            _ => return Ok(object),
        }
    }
    Err(Error::InvalidOutline("reference chain too long".to_string()))
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or PDFDocEncoding)
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        bytes.iter().map(|&b| pdf_doc_char(b)).collect()
    }
}

/// PDFDocEncoding 0x80-0xA0; 0x9F is undefined
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

/// PDFDocEncoding 0x18-0x1F: spacing accents
const PDF_DOC_ACCENTS: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// Decode one PDFDocEncoding byte; outside the two special ranges it matches Latin-1
fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x18..=0x1F => PDF_DOC_ACCENTS[usize::from(byte - 0x18)],
        0x80..=0xA0 => PDF_DOC_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// Flatten an outline tree into bookmarks in pre-order
///
/// Each nested [`OutlineNode::Children`] sequence is one level deeper than
/// the sequence containing it. The first resolver failure aborts the walk.
pub fn flatten_outline<R>(nodes: &[OutlineNode], resolver: &R) -> Result<Vec<Bookmark>>
where
    R: PageResolver + ?Sized,
{
    let mut bookmarks = Vec::new();
    flatten_into(nodes, resolver, 0, &mut bookmarks)?;
    Ok(bookmarks)
}

fn flatten_into<R>(
    nodes: &[OutlineNode],
    resolver: &R,
    depth: usize,
    out: &mut Vec<Bookmark>,
) -> Result<()>
where
    R: PageResolver + ?Sized,
{
    for node in nodes {
        match node {
            OutlineNode::Children(children) => flatten_into(children, resolver, depth + 1, out)?,
            OutlineNode::Entry(entry) => out.push(Bookmark {
                depth,
                title: entry.title.clone(),
                page: resolver.resolve(entry)?,
            }),
        }
    }
    Ok(())
}

/// Number of entries in an outline tree
pub fn count_entries(nodes: &[OutlineNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            OutlineNode::Entry(_) => 1,
            OutlineNode::Children(children) => count_entries(children),
        })
        .sum()
}

/// Stable sort by target page; entries on the same page keep outline order
pub fn sort_by_page(bookmarks: &mut [Bookmark]) {
    bookmarks.sort_by_key(|bookmark| bookmark.page);
}

/// Read, flatten and page-sort the bookmarks of a document
pub fn extract_bookmarks(doc: &Document) -> Result<Vec<Bookmark>> {
    let outline = read_outline(doc)?;
    let resolver = DocumentResolver::new(doc);
    let mut bookmarks = flatten_outline(&outline, &resolver)?;
    sort_by_page(&mut bookmarks);

    log::debug!(
        "Flattened {} outline entries into {} bookmarks",
        count_entries(&outline),
        bookmarks.len()
    );

    Ok(bookmarks)
}
