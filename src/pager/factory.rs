//! Cursor and window bookkeeping.

use crate::pagination::{Page, PageKey, page_containing_offset};
use crate::store::{ChapterState, ChapterStore};

use super::{Blocked, Cursor, Direction, LAST_PAGE, Step, Window};

/// Whether the window is complete or waiting on a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryState {
    /// The current slot holds the page at the cursor.
    Idle,
    /// The cursor sits in `chapter`, which is not Ready. `direction` is
    /// the page turn that crossed into it, if any.
    AwaitingChapter {
        chapter: usize,
        direction: Option<Direction>,
    },
}

/// Owns the navigation cursor, the page window and the chapter store.
///
/// The window only stores [`PageKey`]s; pages are looked up in the store
/// on every query, so a chapter evicted by the store simply reads back as
/// an empty slot.
#[derive(Debug)]
pub struct PageFactory<S> {
    store: S,
    cursor: Cursor,
    window: Window,
    state: FactoryState,
    /// Byte offset to place the cursor at once its chapter is Ready
    anchor: Option<usize>,
    last_direction: Option<Direction>,
}

impl<S: ChapterStore> PageFactory<S> {
    /// Open the store at the first page of the book.
    pub fn new(store: S) -> Self {
        Self::with_cursor(store, Cursor::default())
    }

    /// Open the store at `cursor`, requesting whatever it needs.
    pub fn with_cursor(store: S, cursor: Cursor) -> Self {
        let mut factory = Self {
            store,
            cursor,
            window: Window::default(),
            state: FactoryState::Idle,
            anchor: None,
            last_direction: None,
        };
        factory.refresh();
        factory
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub const fn window(&self) -> Window {
        self.window
    }

    pub const fn state(&self) -> FactoryState {
        self.state
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.resolve(self.window.current)
    }

    pub fn previous_page(&self) -> Option<&Page> {
        self.resolve(self.window.previous)
    }

    pub fn next_page(&self) -> Option<&Page> {
        self.resolve(self.window.next)
    }

    fn resolve(&self, key: Option<PageKey>) -> Option<&Page> {
        self.store.page(key?)
    }

    /// Whether a forward turn may produce a page.
    ///
    /// Chapters that are not loaded yet count as content; failed ones do not.
    pub fn has_next(&self) -> bool {
        let Cursor { chapter, page } = self.cursor;
        if let Some(count) = self.store.page_count(chapter)
            && page.saturating_add(1) < count
        {
            return true;
        }
        chapter + 1 < self.store.chapter_count()
            && self.store.state(chapter + 1).may_have_pages()
    }

    /// Whether a backward turn may produce a page.
    pub fn has_previous(&self) -> bool {
        let Cursor { chapter, page } = self.cursor;
        if let Some(count) = self.store.page_count(chapter)
            && page.min(count - 1) > 0
        {
            return true;
        }
        chapter > 0 && self.store.state(chapter - 1).may_have_pages()
    }

    /// Whether the cursor is on the last page of its chapter.
    pub fn at_chapter_end(&self) -> bool {
        let Cursor { chapter, page } = self.cursor;
        self.store
            .page_count(chapter)
            .map_or(page == LAST_PAGE, |count| page.saturating_add(1) >= count)
    }

    /// Whether the cursor is on the first page of its chapter.
    pub const fn at_chapter_start(&self) -> bool {
        self.cursor.page == 0
    }

    /// Advance one page, crossing into the next chapter at a chapter end.
    pub fn move_to_next(&mut self) -> Step {
        let Cursor { chapter, page } = self.cursor;
        match self.store.page_count(chapter) {
            Some(count) if page.saturating_add(1) < count => {
                self.cursor.page = page + 1;
                self.last_direction = Some(Direction::Next);
                self.refresh();
                Step::Moved
            }
            Some(_) => self.cross_into(Some(chapter + 1), Direction::Next),
            None if page == LAST_PAGE => self.cross_into(Some(chapter + 1), Direction::Next),
            None => self.blocked_on(chapter),
        }
    }

    /// Go back one page, crossing into the previous chapter's last page
    /// at a chapter start.
    pub fn move_to_previous(&mut self) -> Step {
        let Cursor { chapter, page } = self.cursor;
        match self.store.page_count(chapter) {
            Some(count) if page.min(count - 1) > 0 => {
                self.cursor.page = page.min(count - 1) - 1;
                self.last_direction = Some(Direction::Prev);
                self.refresh();
                Step::Moved
            }
            Some(_) => self.cross_into(chapter.checked_sub(1), Direction::Prev),
            None if page == 0 => self.cross_into(chapter.checked_sub(1), Direction::Prev),
            None => self.blocked_on(chapter),
        }
    }

    /// Place the cursor at `cursor` and rebuild the window.
    pub fn jump_to(&mut self, cursor: Cursor) {
        self.anchor = None;
        self.place(cursor, None);
    }

    /// Place the cursor at the page holding byte `offset` of `chapter`,
    /// resolving the page once the chapter is Ready.
    pub fn jump_to_offset(&mut self, chapter: usize, offset: usize) {
        self.anchor = Some(offset);
        self.place(Cursor::new(chapter, 0), None);
    }

    /// Keep the reading offset across a store relayout.
    pub(crate) fn anchor_current(&mut self) {
        if let Some(page) = self.current_page() {
            self.anchor = Some(page.start_offset());
        }
    }

    fn place(&mut self, cursor: Cursor, direction: Option<Direction>) {
        let chapter_count = self.store.chapter_count();
        let clamped = chapter_count > 0 && cursor.chapter >= chapter_count;
        let cursor = if clamped {
            Cursor::chapter_end(chapter_count - 1)
        } else {
            cursor
        };
        // An offset only locates a page in the chapter it was taken from.
        if clamped || direction.is_some() {
            self.anchor = None;
        }
        self.cursor = cursor;
        self.last_direction = direction;
        self.store.retain_around(cursor.chapter);
        self.refresh();
    }

    fn cross_into(&mut self, target: Option<usize>, direction: Direction) -> Step {
        let edge = match direction {
            Direction::Prev => Blocked::AtStart,
            Direction::Next => Blocked::AtEnd,
        };
        let Some(target) = target.filter(|&t| t < self.store.chapter_count()) else {
            return Step::Blocked(edge);
        };
        let entry = match direction {
            Direction::Next => Cursor::new(target, 0),
            Direction::Prev => Cursor::chapter_end(target),
        };
        match self.store.state(target) {
            ChapterState::Failed => {
                tracing::warn!(chapter = target, "refusing to enter failed chapter");
                Step::Blocked(Blocked::ChapterLoadFailed(target))
            }
            ChapterState::Ready => {
                self.place(entry, Some(direction));
                Step::Moved
            }
            ChapterState::NotLoaded | ChapterState::Loading => {
                tracing::debug!(chapter = target, ?direction, "entering chapter before it is ready");
                self.store.request_load(target);
                self.place(entry, Some(direction));
                Step::Awaiting(target)
            }
        }
    }

    fn blocked_on(&mut self, chapter: usize) -> Step {
        match self.store.state(chapter) {
            ChapterState::Failed => Step::Blocked(Blocked::ChapterLoadFailed(chapter)),
            state => {
                if state == ChapterState::NotLoaded {
                    self.store.request_load(chapter);
                }
                Step::Blocked(Blocked::ChapterNotReady(chapter))
            }
        }
    }

    /// Re-derive the whole window from the cursor and the store.
    ///
    /// Clamps the cursor into a Ready chapter and prefetches neighbouring
    /// chapters that are not loaded.
    pub fn refresh(&mut self) {
        let chapter = self.cursor.chapter;
        if chapter >= self.store.chapter_count() {
            self.window = Window::default();
            self.state = FactoryState::Idle;
            return;
        }
        if self.store.state(chapter) == ChapterState::NotLoaded {
            self.store.request_load(chapter);
        }

        let resolved = self.store.pages(chapter).map(|pages| {
            let page = match self.anchor {
                Some(offset) => page_containing_offset(pages, offset),
                None => self.cursor.page.min(pages.len() - 1),
            };
            (page, pages.len())
        });

        self.window = match resolved {
            Some((page, count)) => {
                self.anchor = None;
                self.cursor.page = page;
                Window {
                    previous: if page > 0 {
                        Some(PageKey::new(chapter, page - 1))
                    } else {
                        self.last_page_before(chapter)
                    },
                    current: Some(PageKey::new(chapter, page)),
                    next: if page + 1 < count {
                        Some(PageKey::new(chapter, page + 1))
                    } else {
                        self.first_page_after(chapter)
                    },
                }
            }
            None => Window {
                previous: if self.cursor.page == 0 && self.anchor.is_none() {
                    self.last_page_before(chapter)
                } else {
                    None
                },
                current: None,
                next: if self.cursor.page == LAST_PAGE {
                    self.first_page_after(chapter)
                } else {
                    None
                },
            },
        };

        self.state = if self.window.current.is_some() {
            FactoryState::Idle
        } else {
            FactoryState::AwaitingChapter {
                chapter,
                direction: self.last_direction,
            }
        };

        self.prefetch(chapter + 1);
        if let Some(previous) = chapter.checked_sub(1) {
            self.prefetch(previous);
        }
    }

    /// Point `next` at the first page of the following chapter if the
    /// cursor is on its chapter's last page. Returns whether it applied.
    pub(crate) fn fill_next_boundary(&mut self) -> bool {
        if !self.at_chapter_end() {
            return false;
        }
        self.window.next = self.first_page_after(self.cursor.chapter);
        true
    }

    /// Point `previous` at the last page of the preceding chapter if the
    /// cursor is on its chapter's first page. Returns whether it applied.
    pub(crate) fn fill_previous_boundary(&mut self) -> bool {
        if !self.at_chapter_start() || self.anchor.is_some() {
            return false;
        }
        self.window.previous = self.last_page_before(self.cursor.chapter);
        true
    }

    fn first_page_after(&self, chapter: usize) -> Option<PageKey> {
        let next = chapter + 1;
        self.store
            .page_count(next)
            .map(|_| PageKey::new(next, 0))
    }

    fn last_page_before(&self, chapter: usize) -> Option<PageKey> {
        let previous = chapter.checked_sub(1)?;
        self.store
            .page_count(previous)
            .map(|count| PageKey::new(previous, count - 1))
    }

    fn prefetch(&mut self, chapter: usize) {
        if chapter < self.store.chapter_count()
            && self.store.state(chapter) == ChapterState::NotLoaded
        {
            self.store.request_load(chapter);
        }
    }
}
