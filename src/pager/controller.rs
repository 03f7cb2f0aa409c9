//! Glue between chapter-load completions, the page factory and the
//! rendering surface.

use crate::pagination::{LayoutConstraints, Page};
use crate::store::{ChapterLoadCompleted, ChapterState, ChapterStore};

use super::{Cursor, Direction, PageFactory, Step, Window};

/// Drives a [`PageFactory`] on behalf of the rendering surface.
///
/// The surface calls [`fill_page`](Self::fill_page) after it commits to a
/// page turn and reads the three slots back. Load completions arrive as
/// [`ChapterLoadCompleted`] events, drained from the store with
/// [`pump`](Self::pump) on the same thread, and are checked against the
/// cursor when they are applied rather than when they were requested.
#[derive(Debug)]
pub struct PageViewController<S> {
    factory: PageFactory<S>,
}

impl<S: ChapterStore> PageViewController<S> {
    /// Open `store` at `cursor`.
    pub fn new(store: S, cursor: Cursor) -> Self {
        Self {
            factory: PageFactory::with_cursor(store, cursor),
        }
    }

    /// Open `store` at the page holding byte `offset` of `chapter`.
    pub fn at_offset(store: S, chapter: usize, offset: usize) -> Self {
        let mut controller = Self::new(store, Cursor::new(chapter, 0));
        controller.factory.jump_to_offset(chapter, offset);
        controller
    }

    pub const fn factory(&self) -> &PageFactory<S> {
        &self.factory
    }

    pub const fn store(&self) -> &S {
        self.factory.store()
    }

    pub const fn store_mut(&mut self) -> &mut S {
        self.factory.store_mut()
    }

    pub const fn cursor(&self) -> Cursor {
        self.factory.cursor()
    }

    pub const fn window(&self) -> Window {
        self.factory.window()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.factory.current_page()
    }

    pub fn previous_page(&self) -> Option<&Page> {
        self.factory.previous_page()
    }

    pub fn next_page(&self) -> Option<&Page> {
        self.factory.next_page()
    }

    /// Byte offset of the current page within its chapter.
    pub fn reading_offset(&self) -> Option<usize> {
        self.current_page().map(Page::start_offset)
    }

    /// Shift the window after a committed page turn.
    pub fn fill_page(&mut self, direction: Direction) -> Step {
        let step = match direction {
            Direction::Prev => self.factory.move_to_previous(),
            Direction::Next => self.factory.move_to_next(),
        };
        let cursor = self.cursor();
        tracing::debug!(?direction, ?step, chapter = cursor.chapter, page = cursor.page, "fill page");
        step
    }

    /// A chapter at `offset` from the cursor's chapter finished loading.
    ///
    /// Returns whether the window was touched. Offsets other than -1, 0
    /// and +1, and neighbour loads the cursor is no longer waiting on,
    /// are ignored.
    pub fn chapter_load_finished(&mut self, offset: isize) -> bool {
        match offset {
            0 => {
                self.factory.refresh();
                true
            }
            1 => self.factory.fill_next_boundary(),
            -1 => self.factory.fill_previous_boundary(),
            _ => false,
        }
    }

    /// Apply one completion event against the cursor as it is now.
    pub fn handle_event(&mut self, event: ChapterLoadCompleted) -> bool {
        let offset = event.relative_to(self.cursor().chapter);
        let applied = self.chapter_load_finished(offset);
        if !applied {
            tracing::debug!(chapter = event.chapter, offset, "ignoring stale chapter load");
        }
        crate::perf::log_event(
            "pager.load_finished",
            format!(
                "chapter={} outcome={:?} offset={offset} applied={applied}",
                event.chapter, event.outcome
            ),
        );
        applied
    }

    /// Drain the store's completion queue in arrival order.
    ///
    /// Returns whether any event touched the window.
    pub fn pump(&mut self) -> bool {
        let events = self.factory.store_mut().poll();
        let mut changed = false;
        for event in events {
            changed |= self.handle_event(event);
        }
        changed
    }

    /// Re-request failed chapters the window depends on.
    ///
    /// Returns the chapters that were re-requested.
    pub fn retry(&mut self) -> Vec<usize> {
        let chapter = self.cursor().chapter;
        let candidates = [chapter.checked_sub(1), Some(chapter), Some(chapter + 1)];
        let mut retried = Vec::new();
        for candidate in candidates.into_iter().flatten() {
            if self.store().state(candidate) == ChapterState::Failed {
                self.store_mut().request_load(candidate);
                retried.push(candidate);
            }
        }
        if !retried.is_empty() {
            tracing::info!(?retried, "retrying failed chapters");
        }
        retried
    }

    /// Re-split loaded chapters for a new layout, keeping the reading offset.
    pub fn relayout(&mut self, layout: LayoutConstraints) {
        if layout == self.store().layout() {
            return;
        }
        self.factory.anchor_current();
        self.factory.store_mut().relayout(layout);
        self.factory.refresh();
    }

    /// Jump to the first page of `chapter`.
    pub fn jump_to_chapter(&mut self, chapter: usize) {
        self.factory.jump_to(Cursor::new(chapter, 0));
    }

    /// Jump to `cursor`.
    pub fn jump_to(&mut self, cursor: Cursor) {
        self.factory.jump_to(cursor);
    }

    /// Rebuild the window after the store's contents were replaced.
    pub fn reopen(&mut self, offset: Option<usize>) {
        let chapter = self.cursor().chapter;
        match offset {
            Some(offset) => self.factory.jump_to_offset(chapter, offset),
            None => self.factory.jump_to(self.cursor()),
        }
    }
}
