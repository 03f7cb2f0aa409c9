//! Chapter loading and caching.
//!
//! This module handles:
//! - The [`ChapterStore`] boundary the pager navigates through
//! - [`ChapterSource`]s that fetch raw chapter text
//! - [`BookStore`], which fetches on worker threads and hands completions
//!   back through a single-consumer queue
//! - [`MemoryStore`], a synchronous store for embedding and tests

mod book;
mod memory;
mod source;

pub use book::{BookStore, DEFAULT_CACHE_RADIUS};
pub use memory::MemoryStore;
pub use source::{ChapterSource, DirectorySource, TextFileSource, open_source};

use std::path::PathBuf;

use crate::pagination::{LayoutConstraints, Page, PageKey};

/// Lifecycle of a chapter inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterState {
    #[default]
    NotLoaded,
    Loading,
    Ready,
    Failed,
}

impl ChapterState {
    /// Whether navigation may still expect pages from this chapter.
    pub const fn may_have_pages(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Outcome carried by a [`ChapterLoadCompleted`] event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready,
    Failed,
}

/// A chapter finished loading (or failed to).
///
/// Events are produced by [`ChapterStore::poll`] on the thread that owns
/// the store, so applying them never races cursor or window mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterLoadCompleted {
    pub chapter: usize,
    pub outcome: LoadOutcome,
}

impl ChapterLoadCompleted {
    pub const fn ready(chapter: usize) -> Self {
        Self {
            chapter,
            outcome: LoadOutcome::Ready,
        }
    }

    pub const fn failed(chapter: usize) -> Self {
        Self {
            chapter,
            outcome: LoadOutcome::Failed,
        }
    }

    /// Chapter offset of this event relative to `cursor_chapter`.
    pub fn relative_to(&self, cursor_chapter: usize) -> isize {
        if self.chapter >= cursor_chapter {
            isize::try_from(self.chapter - cursor_chapter).unwrap_or(isize::MAX)
        } else {
            isize::try_from(cursor_chapter - self.chapter).map_or(isize::MIN, |d| -d)
        }
    }
}

/// Errors raised while fetching chapter text.
///
/// These never cross into navigation: a store records them as the
/// chapter's [`ChapterState::Failed`] state.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("chapter {chapter} is out of range ({count} chapters)")]
    OutOfRange { chapter: usize, count: usize },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },
    #[error("no chapters found in {}", path.display())]
    Empty { path: PathBuf },
}

/// Where the pager gets its pages from.
///
/// Loading is fire-and-forget: [`ChapterStore::request_load`] returns
/// immediately and the result surfaces later through
/// [`ChapterStore::poll`].
pub trait ChapterStore {
    /// Total chapters in the book.
    fn chapter_count(&self) -> usize;

    /// Lifecycle state of `chapter`. Out-of-range chapters are `NotLoaded`.
    fn state(&self, chapter: usize) -> ChapterState;

    fn is_ready(&self, chapter: usize) -> bool {
        self.state(chapter) == ChapterState::Ready
    }

    /// Start loading `chapter` if it is not loaded, loading or ready.
    fn request_load(&mut self, chapter: usize);

    /// Pages of a Ready chapter.
    fn pages(&self, chapter: usize) -> Option<&[Page]>;

    fn page(&self, key: PageKey) -> Option<&Page> {
        self.pages(key.chapter)?.get(key.page)
    }

    fn page_count(&self, chapter: usize) -> Option<usize> {
        self.pages(chapter).map(<[Page]>::len)
    }

    /// Display title for `chapter`, when the source knows one.
    fn title(&self, _chapter: usize) -> Option<&str> {
        None
    }

    /// Why `chapter` failed to load, if it is `Failed` and the store kept a reason.
    fn failure(&self, _chapter: usize) -> Option<&str> {
        None
    }

    /// Current layout used for splitting.
    fn layout(&self) -> LayoutConstraints;

    /// Re-split every Ready chapter against new constraints.
    fn relayout(&mut self, layout: LayoutConstraints);

    /// Drain completion events in arrival order.
    fn poll(&mut self) -> Vec<ChapterLoadCompleted>;

    /// Hint that reading is centered on `chapter`; stores may evict
    /// chapters far from it.
    fn retain_around(&mut self, _chapter: usize) {}
}
