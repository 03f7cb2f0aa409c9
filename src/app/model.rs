use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::ConfigFlags;
use crate::pagination::{LayoutConstraints, Page};
use crate::pager::{FactoryState, PageViewController};
use crate::progress::ReadingPosition;
use crate::store::{BookStore, ChapterState, ChapterStore};

/// Rows below the page area reserved for the status bar.
pub const STATUS_ROWS: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the status bar says about the chapter under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterStatus {
    Ready { page: usize, pages: usize },
    Loading,
    Failed(String),
}

/// The complete application state.
///
/// `S` is the chapter store; the binary uses [`BookStore`], tests use
/// [`crate::store::MemoryStore`].
#[derive(Debug)]
pub struct Model<S = BookStore> {
    /// The paginated book
    pub reader: PageViewController<S>,
    /// Path the book was opened from
    pub book_path: PathBuf,
    /// Book title shown in the status bar
    pub book_title: String,
    /// Layout flags used to derive page constraints on resize
    pub flags: ConfigFlags,
    /// Last known terminal size
    pub terminal_size: (u16, u16),
    /// Whether book watching is enabled
    pub watch_enabled: bool,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
    resize_pending: bool,
}

/// Page constraints for a terminal of `width` x `height`.
pub fn page_layout(flags: &ConfigFlags, width: u16, height: u16) -> LayoutConstraints {
    flags.layout(width, height.saturating_sub(STATUS_ROWS))
}

impl<S: ChapterStore> Model<S> {
    pub fn new(reader: PageViewController<S>, book_path: PathBuf, terminal_size: (u16, u16)) -> Self {
        let book_title = book_path
            .file_stem()
            .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().into_owned());
        Self {
            reader,
            book_path,
            book_title,
            flags: ConfigFlags::default(),
            terminal_size,
            watch_enabled: false,
            help_visible: false,
            config_global_path: None,
            config_local_path: None,
            should_quit: false,
            toast: None,
            resize_pending: false,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ConfigFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Constraints for the current terminal size.
    pub fn page_layout(&self) -> LayoutConstraints {
        page_layout(&self.flags, self.terminal_size.0, self.terminal_size.1)
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.reader.current_page()
    }

    pub fn chapter_title(&self) -> String {
        let chapter = self.reader.cursor().chapter;
        self.reader
            .store()
            .title(chapter)
            .map_or_else(|| format!("Chapter {}", chapter + 1), ToOwned::to_owned)
    }

    pub fn chapter_status(&self) -> ChapterStatus {
        let cursor = self.reader.cursor();
        let store = self.reader.store();
        if let Some(pages) = store.page_count(cursor.chapter) {
            return ChapterStatus::Ready {
                page: cursor.page.min(pages.saturating_sub(1)),
                pages,
            };
        }
        match store.state(cursor.chapter) {
            ChapterState::Failed => ChapterStatus::Failed(
                store
                    .failure(cursor.chapter)
                    .unwrap_or("load failed")
                    .to_string(),
            ),
            _ => ChapterStatus::Loading,
        }
    }

    /// Whether the cursor's chapter or a neighbour is still loading.
    pub fn is_loading(&self) -> bool {
        let chapter = self.reader.cursor().chapter;
        let store = self.reader.store();
        matches!(self.reader.factory().state(), FactoryState::AwaitingChapter { .. })
            || [chapter.checked_sub(1), Some(chapter + 1)]
                .into_iter()
                .flatten()
                .any(|c| store.state(c) == ChapterState::Loading)
    }

    /// Apply finished chapter loads. Returns whether anything changed.
    pub fn pump_loads(&mut self) -> bool {
        let waiting = self.reader.factory().state() != FactoryState::Idle;
        let changed = self.reader.pump();
        if waiting
            && changed
            && let ChapterStatus::Failed(reason) = self.chapter_status()
        {
            self.show_toast(ToastLevel::Error, format!("{reason} (r to retry)"));
        }
        changed
    }

    /// Position to persist, if a page is showing.
    pub fn reading_position(&self) -> Option<ReadingPosition> {
        let page = self.current_page()?;
        Some(ReadingPosition {
            chapter: page.chapter(),
            page: page.index(),
            offset: page.start_offset(),
        })
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub(super) const fn set_resize_pending(&mut self, pending: bool) {
        self.resize_pending = pending;
    }

    pub const fn resize_pending(&self) -> bool {
        self.resize_pending
    }
}
