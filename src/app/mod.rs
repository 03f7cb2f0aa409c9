//! Application state and main event loop.
//!
//! This module follows The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{ChapterStatus, Model, STATUS_ROWS, ToastLevel, page_layout};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::ConfigFlags;
use crate::pager::{Cursor, PageViewController};
use crate::progress::{ProgressStore, ReadingPosition};
use crate::store::{BookStore, ChapterSource, ChapterStore, DEFAULT_CACHE_RADIUS, open_source};

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    book_path: PathBuf,
    flags: ConfigFlags,
    progress: Option<ProgressStore>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the book at `book_path`.
    pub fn new(book_path: PathBuf) -> Self {
        Self {
            book_path,
            flags: ConfigFlags::default(),
            progress: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Layout and behaviour flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ConfigFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Restore and save the reading position through `store`.
    #[must_use]
    pub fn with_progress(mut self, store: Option<ProgressStore>) -> Self {
        self.progress = store;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Build the initial model for a terminal of `terminal_size`.
    ///
    /// Opens at `saved` when it still points inside the book.
    pub fn build_model(
        &self,
        source: Arc<dyn ChapterSource>,
        terminal_size: (u16, u16),
        saved: Option<ReadingPosition>,
    ) -> Model<BookStore> {
        let layout = page_layout(&self.flags, terminal_size.0, terminal_size.1);
        let store = BookStore::new(source, layout)
            .with_cache_radius(self.flags.cache_radius.unwrap_or(DEFAULT_CACHE_RADIUS));
        let chapters = store.chapter_count();
        let reader = match saved {
            Some(position) if position.chapter < chapters => {
                tracing::info!(?position, "restoring reading position");
                PageViewController::at_offset(store, position.chapter, position.offset)
            }
            _ => PageViewController::new(store, Cursor::default()),
        };

        let mut model = Model::new(reader, self.book_path.clone(), terminal_size)
            .with_flags(self.flags.clone());
        model.watch_enabled = self.flags.watch;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model
    }

    /// Open the book and run the reader until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the book cannot be opened, the terminal cannot
    /// be initialized, or the event loop hits an I/O failure.
    pub fn run(&self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let source = open_source(&self.book_path)
            .with_context(|| format!("Failed to open book {}", self.book_path.display()))?;
        let saved = self.load_position();

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; folio requires an interactive terminal")?;
        let result = terminal
            .size()
            .context("Failed to read terminal size")
            .and_then(|size| {
                let model = self.build_model(source, (size.width, size.height), saved);
                self.event_loop(&mut terminal, model)
            });
        ratatui::restore();

        let model = result?;
        self.save_position(&model);
        Ok(())
    }

    fn load_position(&self) -> Option<ReadingPosition> {
        let progress = self.progress.as_ref()?;
        match progress.load(&self.book_path) {
            Ok(position) => position,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "ignoring saved reading position");
                None
            }
        }
    }

    fn save_position(&self, model: &Model<BookStore>) {
        let (Some(progress), Some(position)) = (self.progress.as_ref(), model.reading_position())
        else {
            return;
        };
        if let Err(err) = progress.save(&self.book_path, position) {
            tracing::warn!(error = %format!("{err:#}"), "failed to save reading position");
        }
    }
}

#[cfg(test)]
mod tests;
