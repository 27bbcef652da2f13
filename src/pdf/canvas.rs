//! Cursor-driven page writer for the TOC pages
//!
//! Text is laid out one cell at a time from the top of the page. When a cell
//! would cross the bottom page-break margin a fresh page is started and the
//! cursor moves back to the top margin, so callers never count pages.

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use crate::error::Result;
use crate::layout::{Length, PageLayout};
use crate::pdf::fonts::StandardFont;

/// Horizontal padding between the margin and the text inside a cell
const CELL_PADDING: Length = Length(1.0);

/// Horizontal placement of text inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Document information written into the rendered buffer
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
}

/// In-memory page writer
pub struct Canvas {
    layout: PageLayout,
    pages: Vec<Vec<Operation>>,
    y: Length,
    font: StandardFont,
    font_size: f64,
}

impl Canvas {
    /// Start a canvas with one empty page
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            pages: vec![Vec::new()],
            y: layout.margins.top,
            font: StandardFont::Helvetica,
            font_size: 12.0,
        }
    }

    /// Select the font used by subsequent cells
    pub fn set_font(&mut self, font: StandardFont, size: f64) {
        self.font = font;
        self.font_size = size;
    }

    /// Width of `text` in the current font
    pub fn string_width(&self, text: &str) -> Result<Length> {
        self.font.string_width(text, self.font_size)
    }

    /// Current vertical position, measured from the top edge
    pub fn y(&self) -> Length {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = self.layout.margins.top;
    }

    /// Write one line of text in a cell spanning the content width
    ///
    /// The cursor does not move; call [`Canvas::ln`] to advance.
    pub fn cell(&mut self, height: Length, text: &str, align: Align) -> Result<()> {
        if self.y + height > self.layout.page_break_trigger() {
            self.add_page();
        }

        if text.is_empty() {
            return Ok(());
        }

        let encoded = self.font.encode(text)?;
        let x = match align {
            Align::Left => self.layout.margins.left + CELL_PADDING,
            Align::Center => {
                let width = self.string_width(text)?;
                self.layout.margins.left
                    + Length((self.layout.content_width().mm() - width.mm()) / 2.0)
            }
        };

        let font_size = Length::from_pt(self.font_size);
        let baseline = self.y + Length(height.mm() / 2.0 + 0.3 * font_size.mm());
        let pdf_y = self.layout.page.height - baseline;

        let current = self.pages.len() - 1;
        let ops = &mut self.pages[current];
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(self.font.resource_name().as_bytes().to_vec()),
                (self.font_size as f32).into(),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![(x.pt() as f32).into(), (pdf_y.pt() as f32).into()],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encoded, StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));

        Ok(())
    }

    /// Move the cursor down by `height`
    pub fn ln(&mut self, height: Length) {
        self.y = self.y + height;
    }

    /// Serialize every page into a standalone PDF
    pub fn finish(self, info: &DocumentInfo) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in [StandardFont::Helvetica, StandardFont::HelveticaBold] {
            let font_id = doc.add_object(Object::Dictionary(font.dictionary()));
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        let resources_id = doc.add_object(Object::Dictionary(resources));

        let media_box = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            (self.layout.page.width.pt() as f32).into(),
            (self.layout.page.height.pt() as f32).into(),
        ]);

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }.encode()?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set("MediaBox", media_box.clone());
            page.set("Resources", Object::Reference(resources_id));
            page.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));

        let creation_date = Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let mut info_dict = Dictionary::new();
        info_dict.set("Title", Object::string_literal(info.title.as_str()));
        info_dict.set("Producer", Object::string_literal(info.producer.as_str()));
        info_dict.set("CreationDate", Object::string_literal(creation_date));
        let info_id = doc.add_object(Object::Dictionary(info_dict));

        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        doc.compress();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}
