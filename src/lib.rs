// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::ChapterStore)
    clippy::module_name_repetitions
)]

//! # Folio
//!
//! A terminal e-reader that paginates books chapter by chapter.
//!
//! Chapters load in the background while the reader keeps a three-page
//! window (previous, current, next) over whatever is loaded:
//! - Chapter text is split into screen-sized pages on demand
//! - Page turns cross chapter boundaries, even into chapters still loading
//! - Failed chapters are refused and can be retried
//! - Reading position survives restarts and terminal resizes
//!
//! ## Architecture
//!
//! The navigation core is UI-agnostic:
//! - [`pagination`]: Splitting chapter text into pages
//! - [`store`]: Chapter sources, loading and caching
//! - [`pager`]: Cursor, page window and load-completion handling
//!
//! The terminal front end follows The Elm Architecture (TEA):
//! - [`app`]: Model, messages, update and the event loop
//! - [`ui`]: Rendering with ratatui
//! - [`config`], [`progress`], [`watcher`], [`perf`]: Supporting services

pub mod app;
pub mod config;
pub mod pager;
pub mod pagination;
pub mod perf;
pub mod progress;
pub mod store;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::pagination::{LayoutConstraints, Page, PageKey};
    pub use crate::pager::{Cursor, Direction, PageViewController, Step};
    pub use crate::store::{BookStore, ChapterStore, MemoryStore};
}
