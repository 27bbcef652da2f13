//! Table-of-contents layout and rendering
//!
//! Every bookmark past the front matter becomes one line: indent, title, a
//! dot leader and the page number the bookmark will have once the TOC pages
//! are inserted in front of the document.

use crate::error::Result;
use crate::layout::{Length, PageLayout};
use crate::pdf::canvas::{Align, Canvas, DocumentInfo};
use crate::pdf::fonts::StandardFont;
use crate::pdf::outline::Bookmark;

/// Leading bookmarks left out of the printed TOC (cover, copyright, title page, the TOC itself)
pub const FRONT_MATTER_BOOKMARKS_TO_SKIP: usize = 4;

/// Lines assumed to fit on one TOC page when estimating how many pages it needs
pub const ESTIMATED_LINES_PER_PAGE: usize = 33;

/// Re-render limit for [`OffsetStrategy::Converge`]
pub const MAX_OFFSET_PASSES: usize = 8;

/// How the number of inserted TOC pages is determined for page labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetStrategy {
    /// `ceil(bookmarks / lines_per_page)`, computed once before rendering
    #[default]
    Estimate,
    /// Render, count the real pages, re-render until the count stops changing
    Converge,
}

/// Options for rendering the TOC
#[derive(Debug, Clone)]
pub struct TocOptions {
    /// Heading on the first TOC page
    pub title: String,
    /// Heading font size in points (bold)
    pub title_font_size: f64,
    /// Entry font size in points
    pub entry_font_size: f64,
    /// Number of leading page-sorted bookmarks to leave out
    pub front_matter_to_skip: usize,
    /// Divisor for the TOC page-count estimate
    pub lines_per_page: usize,
    /// Indentation repeated once per depth level
    pub indent: String,
    /// Height of the heading and entry cells
    pub cell_height: Length,
    /// Gap between the heading and the first entry
    pub header_advance: Length,
    /// Vertical advance after each entry
    pub line_advance: Length,
    pub offset_strategy: OffsetStrategy,
    pub layout: PageLayout,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            title: "Table of Contents".to_string(),
            title_font_size: 18.0,
            entry_font_size: 12.0,
            front_matter_to_skip: FRONT_MATTER_BOOKMARKS_TO_SKIP,
            lines_per_page: ESTIMATED_LINES_PER_PAGE,
            indent: "    ".to_string(),
            cell_height: Length::from_mm(10.0),
            header_advance: Length::from_mm(10.0),
            line_advance: Length::from_mm(7.5),
            offset_strategy: OffsetStrategy::Estimate,
            layout: PageLayout::default(),
        }
    }
}

/// One formatted TOC entry
#[derive(Debug, Clone, PartialEq)]
pub struct TocLine {
    pub indent: String,
    pub title: String,
    pub dots: String,
    pub page_label: String,
    pub bold: bool,
}

impl TocLine {
    /// Full line as drawn: indent, title, dots, a space, then the label
    pub fn text(&self) -> String {
        format!("{}{}{} {}", self.indent, self.title, self.dots, self.page_label)
    }

    pub fn font(&self) -> StandardFont {
        if self.bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }
}

/// Rendered TOC pages held in memory
#[derive(Debug, Clone)]
pub struct RenderedToc {
    /// Standalone PDF containing only the TOC pages
    pub bytes: Vec<u8>,
    /// Pages the layout actually produced
    pub page_count: usize,
    /// Entry lines drawn (heading excluded)
    pub entry_count: usize,
    /// Page offset used for the printed labels
    pub page_offset: usize,
}

impl RenderedToc {
    /// Whether the printed labels match the real number of TOC pages
    pub fn labels_match_page_count(&self) -> bool {
        self.page_offset == self.page_count
    }
}

/// Estimated number of TOC pages: `ceil(bookmark_count / lines_per_page)`
pub fn page_count_estimate(bookmark_count: usize, lines_per_page: usize) -> usize {
    bookmark_count.div_ceil(lines_per_page.max(1))
}

/// Printed page number of a zero-based source page after `offset` pages are inserted
pub fn page_label(page: u32, offset: usize) -> String {
    (u64::from(page) + offset as u64 + 1).to_string()
}

/// Number of dots that fit between the title and the page label
///
/// Never negative: an over-long title simply gets no leader.
pub fn dot_leader_count(
    available: Length,
    title_width: Length,
    label_width: Length,
    dot_width: Length,
) -> usize {
    if dot_width.mm() <= 0.0 {
        return 0;
    }
    let dots = ((available - title_width - label_width).mm() / dot_width.mm()).floor();
    if dots.is_finite() && dots > 0.0 {
        dots as usize
    } else {
        0
    }
}

/// Format the lines for every bookmark past the front matter
///
/// `bookmarks` must already be sorted by page.
pub fn layout_lines(
    bookmarks: &[Bookmark],
    page_offset: usize,
    options: &TocOptions,
) -> Result<Vec<TocLine>> {
    let available = options.layout.content_width();

    bookmarks
        .iter()
        .skip(options.front_matter_to_skip)
        .map(|bookmark| {
            let font = if bookmark.depth == 0 {
                StandardFont::HelveticaBold
            } else {
                StandardFont::Helvetica
            };
            let size = options.entry_font_size;

            let indent = options.indent.repeat(bookmark.depth);
            let label = page_label(bookmark.page, page_offset);

            let title_width = font.string_width(&format!("{}{}", indent, bookmark.title), size)?;
            let label_width = font.string_width(&label, size)?;
            let dot_width = font.string_width(".", size)?;
            let dots = dot_leader_count(available, title_width, label_width, dot_width);

            Ok(TocLine {
                indent,
                title: bookmark.title.clone(),
                dots: ".".repeat(dots),
                page_label: label,
                bold: bookmark.depth == 0,
            })
        })
        .collect()
}

/// Render the TOC with a fixed page offset
///
/// Pages break automatically as the canvas fills up.
pub fn render_toc(
    bookmarks: &[Bookmark],
    page_offset: usize,
    options: &TocOptions,
) -> Result<RenderedToc> {
    let lines = layout_lines(bookmarks, page_offset, options)?;

    let mut canvas = Canvas::new(options.layout);
    canvas.set_font(StandardFont::HelveticaBold, options.title_font_size);
    canvas.cell(options.cell_height, &options.title, Align::Center)?;
    canvas.ln(options.header_advance);

    for line in &lines {
        canvas.set_font(line.font(), options.entry_font_size);
        canvas.cell(options.cell_height, &line.text(), Align::Left)?;
        canvas.ln(options.line_advance);
    }

    let page_count = canvas.page_count();
    let bytes = canvas.finish(&DocumentInfo {
        title: options.title.clone(),
        producer: concat!("pdf-toc ", env!("CARGO_PKG_VERSION")).to_string(),
    })?;

    Ok(RenderedToc {
        bytes,
        page_count,
        entry_count: lines.len(),
        page_offset,
    })
}

/// Render the TOC, choosing the page offset per `options.offset_strategy`
pub fn build_toc(bookmarks: &[Bookmark], options: &TocOptions) -> Result<RenderedToc> {
    let estimate = page_count_estimate(bookmarks.len(), options.lines_per_page);
    let mut toc = render_toc(bookmarks, estimate, options)?;

    if options.offset_strategy == OffsetStrategy::Converge {
        let mut passes = 1;
        while !toc.labels_match_page_count() && passes < MAX_OFFSET_PASSES {
            log::debug!(
                "TOC rendered to {} pages with offset {}, re-rendering",
                toc.page_count,
                toc.page_offset
            );
            toc = render_toc(bookmarks, toc.page_count, options)?;
            passes += 1;
        }
    }

    if !toc.labels_match_page_count() {
        log::warn!(
            "TOC occupies {} pages but page labels assume {}",
            toc.page_count,
            toc.page_offset
        );
    }

    Ok(toc)
}
