//! Chapter text pagination.
//!
//! This module handles:
//! - Layout constraints for the page area
//! - Wrapping chapter text into display lines
//! - Grouping lines into immutable [`Page`]s

mod layout;
mod page;
mod splitter;

pub use layout::LayoutConstraints;
pub use page::{Page, PageKey};
pub use splitter::{page_containing_offset, split, wrap_lines};
