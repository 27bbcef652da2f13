//! Page geometry for the generated TOC pages

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_mm(215.9),
            height: Length::from_mm(279.4),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::a4()
    }
}

/// Margins for page content
///
/// `bottom` is where automatic page breaks trigger, not a drawing clip.
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// 1 cm on top and sides, 2 cm page-break margin at the bottom
    pub fn toc() -> Self {
        Self {
            bottom: Length::from_mm(20.0),
            ..Self::uniform(Length::from_mm(10.0))
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::toc()
    }
}

/// Page size plus margins
#[derive(Debug, Clone, Copy, Default)]
pub struct PageLayout {
    pub page: PageDimensions,
    pub margins: Margins,
}

impl PageLayout {
    /// Horizontal space between the left and right margins
    pub fn content_width(&self) -> Length {
        self.page.width - self.margins.left - self.margins.right
    }

    /// Vertical position (from the top edge) past which a cell forces a new page
    pub fn page_break_trigger(&self) -> Length {
        self.page.height - self.margins.bottom
    }
}
