use std::time::Duration;

use crate::app::{App, Message, Model, ToastLevel};
use crate::store::{BookStore, open_source};
use crate::watcher::BookWatcher;

impl App {
    pub(super) fn make_book_watcher(&self) -> notify::Result<BookWatcher> {
        BookWatcher::new(&self.book_path, Duration::from_millis(200))
    }

    pub(super) fn handle_message_side_effects(model: &mut Model<BookStore>, msg: Message) {
        if msg == Message::BookChanged {
            Self::reload_book(model);
        }
    }

    /// Re-read the book from disk, keeping the reading offset.
    pub(super) fn reload_book(model: &mut Model<BookStore>) {
        let _scope = crate::perf::scope("app.reload");
        match open_source(&model.book_path) {
            Ok(source) => {
                let offset = model.reader.reading_offset();
                model.reader.store_mut().replace_source(source);
                model.reader.reopen(offset);
                model.show_toast(ToastLevel::Info, "Reloaded");
            }
            Err(err) => {
                tracing::warn!(path = %model.book_path.display(), error = %err, "reload failed");
                model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                crate::perf::log_event(
                    "reload.error",
                    format!("path={} err={err}", model.book_path.display()),
                );
            }
        }
    }
}
