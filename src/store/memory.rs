//! Synchronous in-memory chapter store.

use crate::pagination::{LayoutConstraints, Page, split};

use super::{ChapterLoadCompleted, ChapterState, ChapterStore};

#[derive(Debug, Clone)]
struct MemoryChapter {
    title: String,
    text: String,
    state: ChapterState,
    pages: Vec<Page>,
}

/// A store whose chapter text is already in memory.
///
/// Nothing loads on its own: [`ChapterStore::request_load`] only marks a
/// chapter `Loading` and records the request. The owner decides when a
/// load finishes with [`MemoryStore::complete`] or [`MemoryStore::fail`],
/// which makes it handy for driving the pager deterministically.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    layout: LayoutConstraints,
    chapters: Vec<MemoryChapter>,
    requests: Vec<usize>,
    pending: Vec<ChapterLoadCompleted>,
}

impl MemoryStore {
    /// Create a store with every chapter `NotLoaded`.
    pub fn new(layout: LayoutConstraints, texts: Vec<String>) -> Self {
        let chapters = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| MemoryChapter {
                title: format!("Chapter {}", i + 1),
                text,
                state: ChapterState::NotLoaded,
                pages: Vec::new(),
            })
            .collect();
        Self {
            layout,
            chapters,
            requests: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Create a store with every chapter already `Ready`.
    pub fn loaded(layout: LayoutConstraints, texts: Vec<String>) -> Self {
        let mut store = Self::new(layout, texts);
        for chapter in 0..store.chapters.len() {
            store.set_ready(chapter);
        }
        store
    }

    /// Build a Ready store whose chapters have exactly the given page counts.
    ///
    /// Pages are one line each, reading `c<chapter>p<page>`.
    pub fn with_page_counts(counts: &[usize]) -> Self {
        let texts = counts
            .iter()
            .enumerate()
            .map(|(c, &n)| (0..n).map(|p| format!("c{c}p{p}\n")).collect())
            .collect();
        Self::loaded(LayoutConstraints::new(20, 1), texts)
    }

    /// Force a chapter's state without emitting an event.
    ///
    /// Pages are only visible while the chapter is `Ready`.
    pub fn set_state(&mut self, chapter: usize, state: ChapterState) {
        if state == ChapterState::Ready {
            self.set_ready(chapter);
        } else if let Some(ch) = self.chapters.get_mut(chapter) {
            ch.state = state;
            ch.pages.clear();
        }
    }

    /// Finish loading `chapter` successfully and queue its completion.
    pub fn complete(&mut self, chapter: usize) {
        if chapter < self.chapters.len() {
            self.set_ready(chapter);
            self.pending.push(ChapterLoadCompleted::ready(chapter));
        }
    }

    /// Fail loading `chapter` and queue its completion.
    pub fn fail(&mut self, chapter: usize) {
        if chapter < self.chapters.len() {
            self.set_state(chapter, ChapterState::Failed);
            self.pending.push(ChapterLoadCompleted::failed(chapter));
        }
    }

    /// Chapters passed to `request_load` that actually started a load.
    pub fn requests(&self) -> &[usize] {
        &self.requests
    }

    fn set_ready(&mut self, chapter: usize) {
        let layout = self.layout;
        if let Some(ch) = self.chapters.get_mut(chapter) {
            ch.pages = split(chapter, &ch.text, &layout);
            ch.state = ChapterState::Ready;
        }
    }
}

impl ChapterStore for MemoryStore {
    fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    fn state(&self, chapter: usize) -> ChapterState {
        self.chapters
            .get(chapter)
            .map_or(ChapterState::NotLoaded, |ch| ch.state)
    }

    fn request_load(&mut self, chapter: usize) {
        let Some(ch) = self.chapters.get_mut(chapter) else {
            return;
        };
        if matches!(ch.state, ChapterState::NotLoaded | ChapterState::Failed) {
            ch.state = ChapterState::Loading;
            self.requests.push(chapter);
        }
    }

    fn pages(&self, chapter: usize) -> Option<&[Page]> {
        self.chapters
            .get(chapter)
            .filter(|ch| ch.state == ChapterState::Ready)
            .map(|ch| ch.pages.as_slice())
    }

    fn title(&self, chapter: usize) -> Option<&str> {
        self.chapters.get(chapter).map(|ch| ch.title.as_str())
    }

    fn failure(&self, chapter: usize) -> Option<&str> {
        (self.state(chapter) == ChapterState::Failed).then_some("load failed")
    }

    fn layout(&self) -> LayoutConstraints {
        self.layout
    }

    fn relayout(&mut self, layout: LayoutConstraints) {
        if layout == self.layout {
            return;
        }
        self.layout = layout;
        for (i, ch) in self.chapters.iter_mut().enumerate() {
            if ch.state == ChapterState::Ready {
                ch.pages = split(i, &ch.text, &layout);
            }
        }
    }

    fn poll(&mut self) -> Vec<ChapterLoadCompleted> {
        std::mem::take(&mut self.pending)
    }
}
