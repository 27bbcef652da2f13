//! Integration tests for the PDF TOC library

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use pdf_toc::pdf::{count_pages, extract_bookmarks, OffsetStrategy, TocOptions};
use pdf_toc::pipeline::{generate_pdf_with_toc, TocRequest};
use pdf_toc::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Outline item of a fixture document
struct Item {
    title: &'static str,
    page: usize,
    children: Vec<Item>,
}

fn item(title: &'static str, page: usize, children: Vec<Item>) -> Item {
    Item { title, page, children }
}

fn page_content(index: usize) -> Vec<u8> {
    format!("BT /F1 24 Tf 72 700 Td (Body page {}) Tj ET", index + 1).into_bytes()
}

/// Write items as a sibling chain under `parent`, returning (first, last)
fn write_items(
    doc: &mut Document,
    items: &[Item],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> (ObjectId, ObjectId) {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let mut dict = Dictionary::new();
        dict.set("Title", Object::String(item.title.as_bytes().to_vec(), StringFormat::Literal));
        dict.set("Parent", Object::Reference(parent));
        dict.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(page_ids[item.page]),
                Object::Name(b"Fit".to_vec()),
            ]),
        );
        if i > 0 {
            dict.set("Prev", Object::Reference(ids[i - 1]));
        }
        if i + 1 < ids.len() {
            dict.set("Next", Object::Reference(ids[i + 1]));
        }
        if !item.children.is_empty() {
            let (first, last) = write_items(doc, &item.children, ids[i], page_ids);
            dict.set("First", Object::Reference(first));
            dict.set("Last", Object::Reference(last));
            dict.set("Count", Object::Integer(item.children.len() as i64));
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }

    (ids[0], ids[ids.len() - 1])
}

/// Build a fixture PDF with `page_count` pages and the given outline
fn build_fixture(path: &Path, page_count: usize, outline: &[Item]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Courier".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));
    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut page_ids = Vec::new();
    for i in 0..page_count {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), page_content(i)));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Reference(resources_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        page_ids.push(doc.add_object(Object::Dictionary(page)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_count as i64));
    pages.set(
        "Kids",
        Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    if !outline.is_empty() {
        let outlines_id = doc.new_object_id();
        let (first, last) = write_items(&mut doc, outline, outlines_id, &page_ids);
        let mut outlines = Dictionary::new();
        outlines.set("Type", Object::Name(b"Outlines".to_vec()));
        outlines.set("First", Object::Reference(first));
        outlines.set("Last", Object::Reference(last));
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        catalog.set("Outlines", Object::Reference(outlines_id));
    }

    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).expect("Failed to write fixture");
}

/// A book: front matter on pages 0-3, chapters after, outline not in page order
fn book_outline() -> Vec<Item> {
    vec![
        item("Cover", 0, vec![]),
        item("Copyright", 1, vec![]),
        item("Title Page", 2, vec![]),
        item("Contents", 3, vec![]),
        item(
            "Chapter 1",
            4,
            vec![item("Section 1.1", 5, vec![]), item("Section 1.2", 7, vec![])],
        ),
        item("Appendix", 10, vec![]),
        item("Chapter 2", 8, vec![]),
    ]
}

fn page_contents(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load output");
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

fn setup(page_count: usize, outline: &[Item]) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("book.pdf");
    let output = temp_dir.path().join("book-with-toc.pdf");
    build_fixture(&input, page_count, outline);
    (temp_dir, input, output)
}

#[test]
fn test_output_page_count_is_toc_plus_source() {
    let (_dir, input, output) = setup(12, &book_outline());

    let report = generate_pdf_with_toc(&TocRequest::new(&input, &output))
        .expect("Failed to generate TOC");

    assert_eq!(report.bookmark_count, 9);
    assert_eq!(report.entry_count, 5);
    assert_eq!(report.toc_pages, 1);
    assert_eq!(report.page_offset, 1);
    assert_eq!(report.source_pages, 12);
    assert_eq!(report.total_pages, 13);
    assert_eq!(count_pages(&output).unwrap(), 13);
}

#[test]
fn test_source_pages_are_unmodified_and_follow_the_toc() {
    let (_dir, input, output) = setup(12, &book_outline());
    generate_pdf_with_toc(&TocRequest::new(&input, &output)).unwrap();

    let contents = page_contents(&output);
    assert!(contents[0].contains("(Table of Contents) Tj"));
    for (i, content) in contents[1..].iter().enumerate() {
        assert_eq!(content.as_bytes(), page_content(i).as_slice());
    }
}

#[test]
fn test_toc_lists_entries_in_page_order_with_shifted_labels() {
    let (_dir, input, output) = setup(12, &book_outline());
    generate_pdf_with_toc(&TocRequest::new(&input, &output)).unwrap();

    let toc = &page_contents(&output)[0];
    // Front matter is skipped
    assert!(!toc.contains("Cover"));
    assert!(!toc.contains("Contents."));

    // Sorted by page, not by outline order
    let order: Vec<usize> = ["Section 1.1", "Section 1.2", "Chapter 2", "Appendix"]
        .iter()
        .map(|title| toc.find(title).unwrap_or_else(|| panic!("{title} missing")))
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));

    // Zero-based page 10 + 1 TOC page + 1
    assert!(toc.contains(". 12) Tj"));
    // Section 1.1 on zero-based page 5
    assert!(toc.contains(". 7) Tj"));
    // Indented child entry
    assert!(toc.contains("(    Section 1.1."));
}

#[test]
fn test_four_bookmarks_render_header_only() {
    let outline = vec![
        item("Cover", 0, vec![]),
        item("Copyright", 1, vec![]),
        item("Title Page", 2, vec![]),
        item("Contents", 3, vec![]),
    ];
    let (_dir, input, output) = setup(5, &outline);

    let report = generate_pdf_with_toc(&TocRequest::new(&input, &output)).unwrap();
    assert_eq!(report.entry_count, 0);
    assert_eq!(report.total_pages, 6);

    let toc = &page_contents(&output)[0];
    assert_eq!(toc.matches("Tj").count(), 1);
}

#[test]
fn test_document_without_outline_gets_header_only_toc() {
    let (_dir, input, output) = setup(3, &[]);

    let report = generate_pdf_with_toc(&TocRequest::new(&input, &output)).unwrap();
    assert_eq!(report.bookmark_count, 0);
    assert_eq!(report.page_offset, 0);
    assert_eq!(report.toc_pages, 1);
    assert_eq!(count_pages(&output).unwrap(), 4);
}

#[test]
fn test_bookmarks_still_point_at_their_pages() {
    let (_dir, input, output) = setup(12, &book_outline());
    generate_pdf_with_toc(&TocRequest::new(&input, &output)).unwrap();

    let original = extract_bookmarks(&Document::load(&input).unwrap()).unwrap();
    let carried = extract_bookmarks(&Document::load(&output).unwrap()).unwrap();

    assert_eq!(carried.len(), original.len());
    for (before, after) in original.iter().zip(&carried) {
        assert_eq!(after.title, before.title);
        assert_eq!(after.depth, before.depth);
        assert_eq!(after.page, before.page + 1);
    }
}

#[test]
fn test_long_outline_spans_several_toc_pages() {
    let chapters: Vec<Item> = (0..80).map(|i| item("Chapter", i, vec![])).collect();
    let (_dir, input, output) = setup(80, &chapters);

    let request = TocRequest {
        options: TocOptions {
            offset_strategy: OffsetStrategy::Converge,
            ..Default::default()
        },
        ..TocRequest::new(&input, &output)
    };
    let report = generate_pdf_with_toc(&request).unwrap();

    // 76 lines: 33 on the first page, 35 on the second, 8 on the third
    assert_eq!(report.entry_count, 76);
    assert_eq!(report.toc_pages, 3);
    assert_eq!(report.page_offset, 3);
    assert_eq!(report.total_pages, 83);
}

#[test]
fn test_existing_output_is_overwritten() {
    let (_dir, input, output) = setup(8, &book_outline()[..5]);
    std::fs::write(&output, b"stale").unwrap();

    generate_pdf_with_toc(&TocRequest::new(&input, &output)).unwrap();
    assert_eq!(count_pages(&output).unwrap(), 9);
}

#[test]
fn test_unsupported_title_fails_before_writing() {
    let outline = vec![
        item("Cover", 0, vec![]),
        item("Copyright", 1, vec![]),
        item("Title Page", 2, vec![]),
        item("Contents", 3, vec![]),
        item("Chapter \u{2603}", 4, vec![]),
    ];
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("snow.pdf");
    let output = temp_dir.path().join("out.pdf");
    build_fixture(&input, 5, &outline);

    // Raw UTF-8 bytes decode as Latin-1, so force a UTF-16 title instead
    let mut doc = Document::load(&input).unwrap();
    let title: Vec<u8> = [0xFE, 0xFF]
        .into_iter()
        .chain("Chapter \u{2603}".encode_utf16().flat_map(|unit| unit.to_be_bytes()))
        .collect();
    let ids: Vec<ObjectId> = doc.objects.keys().copied().collect();
    for id in ids {
        if let Ok(dict) = doc.get_dictionary_mut(id) {
            if dict.has(b"Title") && dict.has(b"Dest") {
                let is_chapter = matches!(
                    dict.get(b"Title"),
                    Ok(Object::String(bytes, _)) if bytes.starts_with(b"Chapter")
                );
                if is_chapter {
                    dict.set("Title", Object::String(title.clone(), StringFormat::Hexadecimal));
                }
            }
        }
    }
    doc.save(&input).unwrap();

    let result = generate_pdf_with_toc(&TocRequest::new(&input, &output));
    assert!(matches!(result, Err(Error::UnsupportedCharacter { ch: '\u{2603}', .. })));
    assert!(!output.exists());
}

#[test]
fn test_nonexistent_input() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("output.pdf");

    let result = generate_pdf_with_toc(&TocRequest::new("nonexistent.pdf", &output));
    assert!(result.is_err());

    if let Err(e) = result {
        assert!(
            e.to_string().contains("not found") || e.to_string().contains("nonexistent"),
            "Error should mention file not found: {}",
            e
        );
    }
}

#[test]
fn test_cli_reports_success_once() {
    let (_dir, input, output) = setup(12, &book_outline());

    let result = std::process::Command::new(env!("CARGO_BIN_EXE_pdf-toc"))
        .arg("generate")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pdf-toc");

    assert!(result.status.success());
    assert_eq!(String::from_utf8_lossy(&result.stdout), "PDF created successfully!\n");
    assert!(result.stderr.is_empty(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(count_pages(&output).unwrap(), 13);
}

#[test]
fn test_cli_failure_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.pdf");

    let result = std::process::Command::new(env!("CARGO_BIN_EXE_pdf-toc"))
        .args(["generate", "missing.pdf", "-o"])
        .arg(&output)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pdf-toc");

    assert_eq!(result.status.code(), Some(1));
    assert!(result.stdout.is_empty());
    assert!(String::from_utf8_lossy(&result.stderr).starts_with("Error: "));
    assert!(!output.exists());
}
