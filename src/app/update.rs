use crate::app::{Model, ToastLevel};
use crate::pager::{Blocked, Direction, Step};
use crate::store::ChapterStore;

/// All possible events and actions in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Turn to the next page
    NextPage,
    /// Turn to the previous page
    PrevPage,
    /// Jump to the start of the next chapter
    NextChapter,
    /// Jump to the start of this chapter, or the previous one if already there
    PrevChapter,
    /// Jump to the start of the book
    FirstChapter,
    /// Jump to the start of the last chapter
    LastChapter,

    // Loading
    /// Re-request chapters that failed to load
    Retry,
    /// The book changed on disk
    BookChanged,

    // Help
    ToggleHelp,
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    Quit,
}

/// Apply `msg` to the model.
///
/// Chapter loads requested along the way run in the store; their results
/// arrive later through [`Model::pump_loads`].
pub fn update<S: ChapterStore>(mut model: Model<S>, msg: Message) -> Model<S> {
    match msg {
        Message::NextPage => turn(&mut model, Direction::Next),
        Message::PrevPage => turn(&mut model, Direction::Prev),
        Message::NextChapter => {
            let next = model.reader.cursor().chapter + 1;
            if next < model.reader.store().chapter_count() {
                model.reader.jump_to_chapter(next);
            } else {
                model.show_toast(ToastLevel::Info, "Last chapter");
            }
        }
        Message::PrevChapter => {
            let cursor = model.reader.cursor();
            if cursor.page > 0 {
                model.reader.jump_to_chapter(cursor.chapter);
            } else if let Some(previous) = cursor.chapter.checked_sub(1) {
                model.reader.jump_to_chapter(previous);
            } else {
                model.show_toast(ToastLevel::Info, "First chapter");
            }
        }
        Message::FirstChapter => model.reader.jump_to_chapter(0),
        Message::LastChapter => {
            let count = model.reader.store().chapter_count();
            if count > 0 {
                model.reader.jump_to_chapter(count - 1);
            }
        }
        Message::Retry => {
            let retried = model.reader.retry();
            if retried.is_empty() {
                model.show_toast(ToastLevel::Info, "Nothing to retry");
            } else {
                let list = retried
                    .iter()
                    .map(|c| (c + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                model.show_toast(ToastLevel::Info, format!("Retrying chapter {list}"));
            }
        }
        // Re-reading the book is a side effect; see `App::handle_message_side_effects`.
        Message::BookChanged => {}
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            let layout = model.page_layout();
            model.reader.relayout(layout);
        }
        Message::Quit => model.should_quit = true,
    }
    model
}

fn turn<S: ChapterStore>(model: &mut Model<S>, direction: Direction) {
    match model.reader.fill_page(direction) {
        Step::Moved | Step::Awaiting(_) | Step::Blocked(Blocked::ChapterNotReady(_)) => {}
        Step::Blocked(Blocked::AtEnd) => model.show_toast(ToastLevel::Info, "End of book"),
        Step::Blocked(Blocked::AtStart) => model.show_toast(ToastLevel::Info, "Start of book"),
        Step::Blocked(Blocked::ChapterLoadFailed(chapter)) => {
            let reason = model.reader.store().failure(chapter).unwrap_or("load failed");
            let message = format!("Chapter {} unavailable: {reason} (r to retry)", chapter + 1);
            model.show_toast(ToastLevel::Error, message);
        }
    }
}
