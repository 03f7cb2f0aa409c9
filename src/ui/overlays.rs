use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::store::ChapterStore;

const KEY_HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Pages",
        &[
            ("Right/l/j/Space/PgDn", "Next page"),
            ("Left/h/k/Bksp/PgUp", "Previous page"),
        ],
    ),
    (
        "Chapters",
        &[
            ("]", "Next chapter"),
            ("[", "Chapter start / previous chapter"),
            ("g / Home", "First chapter"),
            ("G / End", "Last chapter"),
            ("r", "Retry failed chapters"),
        ],
    ),
    (
        "Other",
        &[("?", "Toggle help"), ("q / Esc / Ctrl-c", "Quit")],
    ),
];

pub fn help_lines<S: ChapterStore>(model: &Model<S>) -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (section, keys) in KEY_HELP {
        lines.push(Line::styled(*section, section_style));
        for (key, action) in *keys {
            lines.push(Line::raw(format!("  {key:<22}{action}")));
        }
        lines.push(Line::raw(""));
    }

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines
}

pub fn render_help_overlay<S: ChapterStore>(model: &Model<S>, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(help_lines(model)).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
