//! Page value types.

use std::ops::Range;

/// Arena key for a page: `(chapter, page within chapter)`.
///
/// Window slots hold keys rather than pages so that evicting a chapter
/// from the store can never leave a dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    pub chapter: usize,
    pub page: usize,
}

impl PageKey {
    pub const fn new(chapter: usize, page: usize) -> Self {
        Self { chapter, page }
    }
}

/// One screenful of chapter text.
///
/// A page owns the exact slice of chapter text it covers, so the pages of
/// a chapter concatenate back into the chapter. Display lines are byte
/// ranges into that slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    key: PageKey,
    /// Byte offset of `text` within the chapter
    start: usize,
    text: String,
    lines: Vec<Range<usize>>,
}

impl Page {
    pub(crate) const fn new(
        key: PageKey,
        start: usize,
        text: String,
        lines: Vec<Range<usize>>,
    ) -> Self {
        Self {
            key,
            start,
            text,
            lines,
        }
    }

    pub const fn key(&self) -> PageKey {
        self.key
    }

    /// Index of the owning chapter.
    pub const fn chapter(&self) -> usize {
        self.key.chapter
    }

    /// Index of this page within its chapter.
    pub const fn index(&self) -> usize {
        self.key.page
    }

    /// The exact chapter text covered by this page.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset where this page starts in the chapter text.
    pub const fn start_offset(&self) -> usize {
        self.start
    }

    /// Byte offset one past the end of this page in the chapter text.
    pub fn end_offset(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Display lines with line terminators and hanging whitespace removed.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|range| self.text[range.clone()].trim_end())
    }

    /// Raw line ranges into [`Page::text`].
    pub fn line_ranges(&self) -> &[Range<usize>] {
        &self.lines
    }
}
