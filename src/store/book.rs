//! Threaded chapter store backed by a [`ChapterSource`].

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::pagination::{LayoutConstraints, Page, split};

use super::{ChapterLoadCompleted, ChapterSource, ChapterState, ChapterStore, SourceError};

/// Chapters kept on each side of the reading position by default.
pub const DEFAULT_CACHE_RADIUS: usize = 2;

#[derive(Debug, Default)]
struct Slot {
    state: ChapterState,
    text: Option<String>,
    pages: Vec<Page>,
    error: Option<String>,
}

impl Slot {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

struct Fetched {
    chapter: usize,
    generation: u64,
    result: Result<String, SourceError>,
}

/// Fetches chapters on worker threads and splits them on the owner thread.
///
/// Fetch results travel over a channel and are only applied by
/// [`ChapterStore::poll`], so chapter state changes happen on the thread
/// that owns the store.
pub struct BookStore {
    source: Arc<dyn ChapterSource>,
    layout: LayoutConstraints,
    slots: Vec<Slot>,
    tx: Sender<Fetched>,
    rx: Receiver<Fetched>,
    /// Bumped on source replacement; results from older generations are dropped
    generation: u64,
    cache_radius: usize,
    /// Chapter the cache radius is measured from, once known
    focus: Option<usize>,
}

impl std::fmt::Debug for BookStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookStore")
            .field("chapters", &self.slots.len())
            .field("layout", &self.layout)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl BookStore {
    pub fn new(source: Arc<dyn ChapterSource>, layout: LayoutConstraints) -> Self {
        let (tx, rx) = mpsc::channel();
        let slots = (0..source.chapter_count()).map(|_| Slot::default()).collect();
        Self {
            source,
            layout,
            slots,
            tx,
            rx,
            generation: 0,
            cache_radius: DEFAULT_CACHE_RADIUS,
            focus: None,
        }
    }

    /// Keep `radius` chapters on each side of the reading position cached.
    #[must_use]
    pub const fn with_cache_radius(mut self, radius: usize) -> Self {
        self.cache_radius = radius;
        self
    }

    /// Chapters currently in the `Failed` state.
    pub fn failed_chapters(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == ChapterState::Failed)
            .map(|(i, _)| i)
            .collect()
    }

    /// Swap in a re-read source and forget every loaded chapter.
    ///
    /// Loads still in flight for the old source are discarded on arrival.
    pub fn replace_source(&mut self, source: Arc<dyn ChapterSource>) {
        self.generation += 1;
        self.slots = (0..source.chapter_count()).map(|_| Slot::default()).collect();
        self.source = source;
        tracing::info!(
            chapters = self.slots.len(),
            generation = self.generation,
            "book source replaced"
        );
    }

    fn apply(&mut self, fetched: Fetched) -> Option<ChapterLoadCompleted> {
        if fetched.generation != self.generation {
            tracing::debug!(chapter = fetched.chapter, "dropping load from replaced source");
            return None;
        }
        let layout = self.layout;
        let outside = self
            .focus
            .is_some_and(|focus| fetched.chapter.abs_diff(focus) > self.cache_radius);
        let slot = self.slots.get_mut(fetched.chapter)?;
        if outside && fetched.result.is_ok() {
            tracing::debug!(chapter = fetched.chapter, "dropping load outside cache radius");
            slot.clear();
            return None;
        }
        match fetched.result {
            Ok(text) => {
                let _scope = crate::perf::scope("store.split");
                slot.pages = split(fetched.chapter, &text, &layout);
                slot.text = Some(text);
                slot.state = ChapterState::Ready;
                slot.error = None;
                crate::perf::log_event(
                    "store.ready",
                    format!("chapter={} pages={}", fetched.chapter, slot.pages.len()),
                );
                Some(ChapterLoadCompleted::ready(fetched.chapter))
            }
            Err(err) => {
                tracing::warn!(chapter = fetched.chapter, error = %err, "chapter load failed");
                slot.clear();
                slot.state = ChapterState::Failed;
                slot.error = Some(err.to_string());
                Some(ChapterLoadCompleted::failed(fetched.chapter))
            }
        }
    }
}

impl ChapterStore for BookStore {
    fn chapter_count(&self) -> usize {
        self.slots.len()
    }

    fn state(&self, chapter: usize) -> ChapterState {
        self.slots
            .get(chapter)
            .map_or(ChapterState::NotLoaded, |slot| slot.state)
    }

    fn request_load(&mut self, chapter: usize) {
        let Some(slot) = self.slots.get_mut(chapter) else {
            return;
        };
        if !matches!(slot.state, ChapterState::NotLoaded | ChapterState::Failed) {
            return;
        }
        slot.state = ChapterState::Loading;
        slot.error = None;

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let generation = self.generation;
        tracing::debug!(chapter, "requesting chapter load");
        let spawned = thread::Builder::new()
            .name(format!("folio-load-{chapter}"))
            .spawn(move || {
                let result = source.fetch(chapter);
                // The store may be gone by now; nothing to report to.
                let _ = tx.send(Fetched {
                    chapter,
                    generation,
                    result,
                });
            });
        if let Err(err) = spawned {
            tracing::warn!(chapter, error = %err, "failed to spawn chapter loader");
            slot.state = ChapterState::Failed;
            slot.error = Some(format!("loader unavailable: {err}"));
        }
    }

    fn pages(&self, chapter: usize) -> Option<&[Page]> {
        self.slots
            .get(chapter)
            .filter(|slot| slot.state == ChapterState::Ready)
            .map(|slot| slot.pages.as_slice())
    }

    fn title(&self, chapter: usize) -> Option<&str> {
        self.source.title(chapter)
    }

    fn failure(&self, chapter: usize) -> Option<&str> {
        self.slots.get(chapter)?.error.as_deref()
    }

    fn layout(&self) -> LayoutConstraints {
        self.layout
    }

    fn relayout(&mut self, layout: LayoutConstraints) {
        if layout == self.layout {
            return;
        }
        let _scope = crate::perf::scope("store.relayout");
        self.layout = layout;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(text) = slot.text.as_deref() {
                slot.pages = split(i, text, &layout);
            }
        }
        crate::perf::log_event(
            "store.relayout",
            format!("width={} height={}", layout.width(), layout.height()),
        );
    }

    fn poll(&mut self) -> Vec<ChapterLoadCompleted> {
        let mut events = Vec::new();
        while let Ok(fetched) = self.rx.try_recv() {
            if let Some(event) = self.apply(fetched) {
                events.push(event);
            }
        }
        events
    }

    fn retain_around(&mut self, chapter: usize) {
        self.focus = Some(chapter);
        let radius = self.cache_radius;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i.abs_diff(chapter) > radius && slot.state == ChapterState::Ready {
                tracing::debug!(chapter = i, "evicting chapter");
                slot.clear();
            }
        }
    }
}
