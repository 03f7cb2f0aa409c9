use crate::pagination::PageKey;

/// Stored page index meaning "the last page of the chapter".
///
/// Used when stepping back into a chapter whose page count is not known
/// yet; it is clamped once the chapter is Ready.
pub const LAST_PAGE: usize = usize::MAX;

/// Logical reading position.
///
/// While the chapter is Ready, `page` is always a valid index into its
/// page list. While it is not, `page` keeps whatever was stored (a resume
/// position, `0`, or [`LAST_PAGE`]) until it can be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    pub chapter: usize,
    pub page: usize,
}

impl Cursor {
    pub const fn new(chapter: usize, page: usize) -> Self {
        Self { chapter, page }
    }

    /// The last page of `chapter`, whatever its length turns out to be.
    pub const fn chapter_end(chapter: usize) -> Self {
        Self::new(chapter, LAST_PAGE)
    }

    pub const fn key(&self) -> PageKey {
        PageKey::new(self.chapter, self.page)
    }
}

/// The three buffered page slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub previous: Option<PageKey>,
    pub current: Option<PageKey>,
    pub next: Option<PageKey>,
}

impl Window {
    pub const fn is_empty(&self) -> bool {
        self.previous.is_none() && self.current.is_none() && self.next.is_none()
    }
}
