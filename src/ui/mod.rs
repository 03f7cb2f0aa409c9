//! Terminal UI components.
//!
//! One page fills the screen above a single status row. The help overlay
//! is drawn on top when visible.

mod overlays;
mod render;
mod status;

pub use render::{page_area, render, status_area};
pub use status::status_text;
