use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{ChapterStatus, Model, STATUS_ROWS};
use crate::pagination::Page;
use crate::store::ChapterStore;

use super::{overlays, status};

/// The area pages are laid out in: everything above the status bar.
pub const fn page_area(area: Rect) -> Rect {
    Rect {
        height: area.height.saturating_sub(STATUS_ROWS),
        ..area
    }
}

pub const fn status_area(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height.saturating_sub(STATUS_ROWS),
        height: if area.height < STATUS_ROWS {
            area.height
        } else {
            STATUS_ROWS
        },
        ..area
    }
}

/// Render the complete UI.
pub fn render<S: ChapterStore>(model: &Model<S>, frame: &mut Frame) {
    let area = frame.area();
    let pages = page_area(area);

    match model.current_page() {
        Some(page) => render_page(model, page, frame, pages),
        None => render_placeholder(model, frame, pages),
    }

    let bar = status_area(area);
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, bar);
    } else {
        status::render_status_bar(model, frame, bar);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_page<S: ChapterStore>(model: &Model<S>, page: &Page, frame: &mut Frame, area: Rect) {
    let layout = model.reader.store().layout();
    let text_area = Rect {
        x: area.x + layout.margin_x().min(area.width),
        y: area.y + layout.margin_y().min(area.height),
        width: area.width.saturating_sub(layout.margin_x().saturating_mul(2)),
        height: area.height.saturating_sub(layout.margin_y().saturating_mul(2)),
    };

    let gap = usize::from(layout.line_height().max(1) - 1);
    let mut lines: Vec<Line> = Vec::with_capacity(page.line_count() * (gap + 1));
    for line in page.lines() {
        lines.push(Line::raw(line));
        lines.extend(std::iter::repeat_n(Line::raw(""), gap));
    }
    frame.render_widget(Paragraph::new(lines), text_area);
}

fn render_placeholder<S: ChapterStore>(model: &Model<S>, frame: &mut Frame, area: Rect) {
    let (message, style) = match model.chapter_status() {
        ChapterStatus::Failed(reason) => (
            format!("{}: {reason}\nPress r to retry.", model.chapter_title()),
            Style::default().fg(Color::Red),
        ),
        _ => (
            format!("Loading {}...", model.chapter_title()),
            Style::default().fg(Color::Indexed(245)),
        ),
    };
    let middle = Rect {
        y: area.y + area.height / 2,
        height: area.height - area.height / 2,
        ..area
    };
    frame.render_widget(
        Paragraph::new(message)
            .style(style)
            .alignment(Alignment::Center),
        middle,
    );
}
