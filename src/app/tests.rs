use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;

use crate::pagination::LayoutConstraints;
use crate::pager::{Cursor, PageViewController};
use crate::progress::ReadingPosition;
use crate::store::{BookStore, ChapterState, ChapterStore, MemoryStore, TextFileSource};

use super::event_loop::ResizeDebouncer;
use super::input::handle_key;
use super::{App, ChapterStatus, Message, Model, ToastLevel, update};

fn model_with_counts(counts: &[usize], cursor: Cursor) -> Model<MemoryStore> {
    let store = MemoryStore::with_page_counts(counts);
    Model::new(
        PageViewController::new(store, cursor),
        PathBuf::from("book.txt"),
        (24, 2),
    )
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn toast_text<S: ChapterStore>(model: &Model<S>) -> Option<String> {
    model.active_toast().map(|(msg, _)| msg.to_string())
}

fn wait_for_page(model: &mut Model<BookStore>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while model.current_page().is_none() && Instant::now() < deadline {
        model.pump_loads();
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(model.current_page().is_some(), "chapter should load in time");
}

#[test]
fn test_next_and_prev_page_move_cursor() {
    let model = model_with_counts(&[2, 1], Cursor::default());

    let model = update(model, Message::NextPage);
    assert_eq!(model.reader.cursor(), Cursor::new(0, 1));

    let model = update(model, Message::NextPage);
    assert_eq!(model.reader.cursor(), Cursor::new(1, 0));

    let model = update(model, Message::PrevPage);
    assert_eq!(model.reader.cursor(), Cursor::new(0, 1));
}

#[test]
fn test_next_page_at_book_end_shows_toast() {
    let model = model_with_counts(&[1, 2], Cursor::new(1, 1));
    let model = update(model, Message::NextPage);
    assert_eq!(model.reader.cursor(), Cursor::new(1, 1));
    assert_eq!(toast_text(&model).as_deref(), Some("End of book"));
}

#[test]
fn test_prev_page_at_book_start_shows_toast() {
    let model = model_with_counts(&[2], Cursor::default());
    let model = update(model, Message::PrevPage);
    assert_eq!(toast_text(&model).as_deref(), Some("Start of book"));
}

#[test]
fn test_next_page_into_failed_chapter_reports_error() {
    let mut model = model_with_counts(&[1, 2], Cursor::default());
    model.reader.store_mut().set_state(1, ChapterState::Failed);

    let model = update(model, Message::NextPage);

    assert_eq!(model.reader.cursor(), Cursor::new(0, 0));
    let (message, level) = model.active_toast().expect("toast should be set");
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("Chapter 2 unavailable"));
    assert!(message.contains("r to retry"));
}

#[test]
fn test_next_chapter_jumps_to_chapter_start() {
    let model = model_with_counts(&[3, 2, 2], Cursor::new(0, 1));
    let model = update(model, Message::NextChapter);
    assert_eq!(model.reader.cursor(), Cursor::new(1, 0));

    let model = update(model, Message::NextChapter);
    let model = update(model, Message::NextChapter);
    assert_eq!(model.reader.cursor(), Cursor::new(2, 0));
    assert_eq!(toast_text(&model).as_deref(), Some("Last chapter"));
}

#[test]
fn test_prev_chapter_goes_to_start_then_previous_chapter() {
    let model = model_with_counts(&[3, 3], Cursor::new(1, 2));

    let model = update(model, Message::PrevChapter);
    assert_eq!(model.reader.cursor(), Cursor::new(1, 0));

    let model = update(model, Message::PrevChapter);
    assert_eq!(model.reader.cursor(), Cursor::new(0, 0));

    let model = update(model, Message::PrevChapter);
    assert_eq!(toast_text(&model).as_deref(), Some("First chapter"));
}

#[test]
fn test_first_and_last_chapter() {
    let model = model_with_counts(&[2, 2, 2], Cursor::new(1, 1));

    let model = update(model, Message::LastChapter);
    assert_eq!(model.reader.cursor(), Cursor::new(2, 0));

    let model = update(model, Message::FirstChapter);
    assert_eq!(model.reader.cursor(), Cursor::new(0, 0));
}

#[test]
fn test_retry_requests_failed_chapter() {
    let mut model = model_with_counts(&[2, 2], Cursor::new(0, 1));
    model.reader.store_mut().set_state(1, ChapterState::Failed);

    let model = update(model, Message::Retry);

    assert_eq!(model.reader.store().state(1), ChapterState::Loading);
    assert_eq!(toast_text(&model).as_deref(), Some("Retrying chapter 2"));
}

#[test]
fn test_retry_with_nothing_failed() {
    let model = model_with_counts(&[2], Cursor::default());
    let model = update(model, Message::Retry);
    assert_eq!(toast_text(&model).as_deref(), Some("Nothing to retry"));
}

#[test]
fn test_pump_loads_fills_current_page() {
    let store = MemoryStore::new(
        LayoutConstraints::new(20, 2),
        vec!["first chapter".to_string(), "second chapter".to_string()],
    );
    let mut model = Model::new(
        PageViewController::new(store, Cursor::default()),
        PathBuf::from("book.txt"),
        (24, 3),
    );
    assert_eq!(model.chapter_status(), ChapterStatus::Loading);
    assert!(model.is_loading());

    model.reader.store_mut().complete(0);
    assert!(model.pump_loads());

    assert_eq!(model.current_page().map(|p| p.text()), Some("first chapter"));
    assert_eq!(model.chapter_status(), ChapterStatus::Ready { page: 0, pages: 1 });
    assert!(!model.pump_loads());
}

#[test]
fn test_pump_loads_reports_failure_of_current_chapter() {
    let store = MemoryStore::new(LayoutConstraints::new(20, 2), vec!["text".to_string()]);
    let mut model = Model::new(
        PageViewController::new(store, Cursor::default()),
        PathBuf::from("book.txt"),
        (24, 3),
    );

    model.reader.store_mut().fail(0);
    assert!(model.pump_loads());

    assert_eq!(
        model.chapter_status(),
        ChapterStatus::Failed("load failed".to_string())
    );
    let (message, level) = model.active_toast().expect("toast should be set");
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("r to retry"));
}

#[test]
fn test_resize_relayouts_and_keeps_offset() {
    let text: String = (0..8).map(|i| format!("line {i}\n")).collect();
    let store = MemoryStore::loaded(LayoutConstraints::new(10, 2), vec![text]);
    let mut model = Model::new(
        PageViewController::new(store, Cursor::new(0, 2)),
        PathBuf::from("book.txt"),
        (14, 3),
    );
    assert_eq!(model.reader.reading_offset(), Some(28));

    model = update(model, Message::Resize(14, 5));

    assert_eq!(model.terminal_size, (14, 5));
    assert_eq!(model.reader.store().layout().lines_per_page(), 4);
    assert_eq!(model.reader.cursor(), Cursor::new(0, 1));
    assert_eq!(model.reader.reading_offset(), Some(28));
}

#[test]
fn test_reading_position_tracks_current_page() {
    let model = model_with_counts(&[2, 3], Cursor::new(1, 2));
    let position = model.reading_position().expect("page is showing");
    assert_eq!(position.chapter, 1);
    assert_eq!(position.page, 2);
    assert_eq!(position.offset, "c1p0\nc1p1\n".len());
}

#[test]
fn test_toggle_help_and_quit() {
    let model = model_with_counts(&[1], Cursor::default());
    let model = update(model, Message::ToggleHelp);
    assert!(model.help_visible);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_toast_lifecycle() {
    let mut model = model_with_counts(&[1], Cursor::default());
    model.show_toast(ToastLevel::Warning, "watch failed");
    let (msg, level) = model.active_toast().expect("toast should be set");
    assert_eq!(msg, "watch failed");
    assert_eq!(level, ToastLevel::Warning);
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_page_turn_keys() {
    for code in [
        KeyCode::Right,
        KeyCode::PageDown,
        KeyCode::Char(' '),
        KeyCode::Char('l'),
        KeyCode::Char('j'),
    ] {
        assert_eq!(handle_key(key(code), false), Some(Message::NextPage), "{code:?}");
    }
    for code in [
        KeyCode::Left,
        KeyCode::PageUp,
        KeyCode::Backspace,
        KeyCode::Char('h'),
        KeyCode::Char('k'),
    ] {
        assert_eq!(handle_key(key(code), false), Some(Message::PrevPage), "{code:?}");
    }
}

#[test]
fn test_chapter_and_app_keys() {
    assert_eq!(handle_key(key(KeyCode::Char(']')), false), Some(Message::NextChapter));
    assert_eq!(handle_key(key(KeyCode::Char('[')), false), Some(Message::PrevChapter));
    assert_eq!(handle_key(key(KeyCode::Char('g')), false), Some(Message::FirstChapter));
    assert_eq!(handle_key(key(KeyCode::Char('G')), false), Some(Message::LastChapter));
    assert_eq!(handle_key(key(KeyCode::Char('r')), false), Some(Message::Retry));
    assert_eq!(handle_key(key(KeyCode::Char('?')), false), Some(Message::ToggleHelp));
    assert_eq!(handle_key(key(KeyCode::Char('q')), false), Some(Message::Quit));
    assert_eq!(handle_key(key(KeyCode::Esc), false), Some(Message::Quit));
    assert_eq!(
        handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
        Some(Message::Quit)
    );
}

#[test]
fn test_help_visible_swallows_navigation() {
    assert_eq!(handle_key(key(KeyCode::Right), true), None);
    assert_eq!(handle_key(key(KeyCode::Esc), true), Some(Message::HideHelp));
    assert_eq!(handle_key(key(KeyCode::Char('?')), true), Some(Message::HideHelp));
}

#[test]
fn test_resize_debouncer_waits_for_quiet_period() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);

    assert!(debouncer.is_pending());
    assert!(debouncer.take_ready(50).is_none());
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
    assert!(!debouncer.is_pending());
}

#[test]
fn test_resize_debouncer_keeps_latest_size() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(100, 30, 0);
    debouncer.queue(120, 40, 60);

    assert!(debouncer.take_ready(120).is_none());
    assert_eq!(debouncer.take_ready(160), Some((120, 40)));
}

#[test]
fn test_build_model_restores_saved_position() {
    let text = "Chapter 1\none\n\nChapter 2\ntwo\n\nChapter 3\nthree\n".to_string();
    let source = Arc::new(TextFileSource::from_text("book", text));
    let app = App::new(PathBuf::from("book.txt"));
    let saved = ReadingPosition {
        chapter: 1,
        page: 0,
        offset: 0,
    };

    let mut model = app.build_model(source, (40, 10), Some(saved));
    wait_for_page(&mut model);

    assert_eq!(model.reader.cursor().chapter, 1);
    assert!(model.current_page().is_some_and(|p| p.text().contains("two")));
}

#[test]
fn test_build_model_ignores_position_past_book_end() {
    let source = Arc::new(TextFileSource::from_text("book", "just one chapter".to_string()));
    let app = App::new(PathBuf::from("book.txt"));
    let saved = ReadingPosition {
        chapter: 9,
        page: 4,
        offset: 100,
    };

    let mut model = app.build_model(source, (40, 10), Some(saved));
    wait_for_page(&mut model);

    assert_eq!(model.reader.cursor(), Cursor::new(0, 0));
}

#[test]
fn test_book_changed_reloads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.txt");
    std::fs::write(&path, "Chapter 1\nold text\n").unwrap();
    let app = App::new(path.clone());
    let source = crate::store::open_source(&path).unwrap();
    let mut model = app.build_model(source, (40, 10), None);
    wait_for_page(&mut model);
    assert_eq!(model.reader.store().chapter_count(), 1);

    std::fs::write(&path, "Chapter 1\nnew text\n\nChapter 2\nmore\n").unwrap();
    model = update(model, Message::BookChanged);
    App::handle_message_side_effects(&mut model, Message::BookChanged);
    assert_eq!(toast_text(&model).as_deref(), Some("Reloaded"));
    wait_for_page(&mut model);

    assert_eq!(model.reader.store().chapter_count(), 2);
    assert!(model.current_page().is_some_and(|p| p.text().contains("new text")));
}

#[test]
fn test_reload_with_fewer_chapters_lands_on_last_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.txt");
    std::fs::write(&path, "Chapter 1
one

Chapter 2
two

Chapter 3
three
").unwrap();
    let app = App::new(path.clone());
    let source = crate::store::open_source(&path).unwrap();
    let saved = ReadingPosition {
        chapter: 2,
        page: 0,
        offset: 0,
    };
    let mut model = app.build_model(source, (40, 10), Some(saved));
    wait_for_page(&mut model);
    assert_eq!(model.reader.cursor(), Cursor::new(2, 0));

    let long: String = (0..30).map(|i| format!("line {i}\n")).collect();
    std::fs::write(&path, format!("Chapter 1\n{long}")).unwrap();
    App::reload_book(&mut model);
    wait_for_page(&mut model);

    let pages = model.reader.store().page_count(0).unwrap();
    assert!(pages > 1);
    assert_eq!(model.reader.cursor(), Cursor::new(0, pages - 1));
    assert!(model.current_page().is_some_and(|p| p.text().contains("line 29")));
}

#[test]
fn test_reload_of_missing_book_keeps_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.txt");
    std::fs::write(&path, "some text\n").unwrap();
    let app = App::new(path.clone());
    let source = crate::store::open_source(&path).unwrap();
    let mut model = app.build_model(source, (40, 10), None);
    wait_for_page(&mut model);

    std::fs::remove_file(&path).unwrap();
    App::reload_book(&mut model);

    let (message, level) = model.active_toast().expect("toast should be set");
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Reload failed"));
    assert!(model.current_page().is_some());
}
