use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{ChapterStatus, Model, ToastLevel};
use crate::store::ChapterStore;

pub fn status_text<S: ChapterStore>(model: &Model<S>) -> String {
    let cursor = model.reader.cursor();
    let chapters = model.reader.store().chapter_count();
    let chapter_info = format!("ch {}/{}", cursor.chapter + 1, chapters);
    let page_info = match model.chapter_status() {
        ChapterStatus::Ready { page, pages } => format!("p {}/{}", page + 1, pages),
        ChapterStatus::Loading => "[loading]".to_string(),
        ChapterStatus::Failed(_) => "[failed: r to retry]".to_string(),
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };

    format!(
        " {} | {}  {}  {}{}  ?:help",
        model.book_title,
        model.chapter_title(),
        chapter_info,
        page_info,
        watch_indicator
    )
}

pub fn render_status_bar<S: ChapterStore>(model: &Model<S>, frame: &mut Frame, area: Rect) {
    let style = match model.chapter_status() {
        ChapterStatus::Failed(_) => Style::default().bg(Color::Red).fg(Color::White),
        _ => Style::default().bg(Color::DarkGray).fg(Color::White),
    };
    frame.render_widget(Paragraph::new(status_text(model)).style(style), area);
}

pub fn render_toast_bar<S: ChapterStore>(model: &Model<S>, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
