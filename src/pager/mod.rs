//! Windowed, chapter-aware page navigation.
//!
//! The pager keeps a navigation [`Cursor`] and a three-slot [`Window`]
//! (previous, current, next) over pages held by a
//! [`ChapterStore`](crate::store::ChapterStore):
//! - [`PageFactory`]: cursor, window and the move operations
//! - [`PageViewController`]: applies chapter-load completions and exposes
//!   page turns to the rendering surface
//!
//! Navigation never fails. A move that cannot happen reports why through
//! [`Step::Blocked`] and leaves the cursor and window untouched.

mod controller;
mod factory;
mod window;

pub use controller::PageViewController;
pub use factory::{FactoryState, PageFactory};
pub use window::{Cursor, LAST_PAGE, Window};

/// Page-turn direction reported by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Prev,
    Next,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved and the current page is available.
    Moved,
    /// The cursor crossed into a chapter that is still loading; the
    /// window fills in once the chapter is Ready.
    Awaiting(usize),
    /// The move was refused.
    Blocked(Blocked),
}

impl Step {
    pub const fn moved(self) -> bool {
        matches!(self, Self::Moved | Self::Awaiting(_))
    }
}

/// Why a navigation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Blocked {
    #[error("already at the first page")]
    AtStart,
    #[error("already at the last page")]
    AtEnd,
    #[error("chapter {0} is not loaded yet")]
    ChapterNotReady(usize),
    #[error("chapter {0} failed to load")]
    ChapterLoadFailed(usize),
}
