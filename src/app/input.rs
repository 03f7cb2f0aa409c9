use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::Message;

use super::event_loop::ResizeDebouncer;

/// Translate a terminal event into a message.
///
/// Resizes are queued on the debouncer instead of producing a message.
pub(super) fn handle_event(
    event: &Event,
    help_visible: bool,
    now_ms: u64,
    resize_debouncer: &mut ResizeDebouncer,
) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(*key, help_visible),
        Event::Resize(w, h) => {
            crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
            resize_debouncer.queue(*w, *h, now_ms);
            None
        }
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, help_visible: bool) -> Option<Message> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'q') => Some(Message::Quit),
            _ => None,
        };
    }

    if help_visible {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Message::HideHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Right
        | KeyCode::PageDown
        | KeyCode::Char(' ' | 'l' | 'j') => Some(Message::NextPage),
        KeyCode::Left
        | KeyCode::PageUp
        | KeyCode::Backspace
        | KeyCode::Char('h' | 'k') => Some(Message::PrevPage),
        KeyCode::Char(']') => Some(Message::NextChapter),
        KeyCode::Char('[') => Some(Message::PrevChapter),
        KeyCode::Char('g') | KeyCode::Home => Some(Message::FirstChapter),
        KeyCode::Char('G') | KeyCode::End => Some(Message::LastChapter),
        KeyCode::Char('r') => Some(Message::Retry),
        KeyCode::Char('?') => Some(Message::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
        _ => None,
    }
}
