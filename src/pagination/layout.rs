//! Layout constraints for the page area.

/// The geometry a chapter is paginated against.
///
/// Sizes are in terminal cells. `line_height` plays the role of font
/// metrics: each text line occupies that many rows.
///
/// # Example
///
/// ```
/// use folio::pagination::LayoutConstraints;
///
/// let layout = LayoutConstraints::new(80, 24).with_margins(2, 1);
/// assert_eq!(layout.text_width(), 76);
/// assert_eq!(layout.lines_per_page(), 22);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutConstraints {
    width: u16,
    height: u16,
    margin_x: u16,
    margin_y: u16,
    line_height: u16,
}

impl LayoutConstraints {
    /// Create constraints for a `width` x `height` page with no margins.
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            margin_x: 0,
            margin_y: 0,
            line_height: 1,
        }
    }

    /// Set horizontal and vertical margins (applied on both sides).
    #[must_use]
    pub const fn with_margins(mut self, margin_x: u16, margin_y: u16) -> Self {
        self.margin_x = margin_x;
        self.margin_y = margin_y;
        self
    }

    /// Set how many rows one text line occupies.
    #[must_use]
    pub const fn with_line_height(mut self, line_height: u16) -> Self {
        self.line_height = line_height;
        self
    }

    /// Return the same constraints resized to a new page area.
    #[must_use]
    pub const fn resized(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn margin_x(&self) -> u16 {
        self.margin_x
    }

    pub const fn margin_y(&self) -> u16 {
        self.margin_y
    }

    pub const fn line_height(&self) -> u16 {
        self.line_height
    }

    /// Usable columns per line. Never zero.
    pub fn text_width(&self) -> usize {
        let usable = self.width.saturating_sub(self.margin_x.saturating_mul(2));
        usize::from(usable).max(1)
    }

    /// Text lines that fit on one page. Never zero.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.height.saturating_sub(self.margin_y.saturating_mul(2));
        let rows_per_line = self.line_height.max(1);
        usize::from(usable / rows_per_line).max(1)
    }
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
