use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::store::BookStore;
use crate::watcher::BookWatcher;

use super::input::handle_event;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    pub(super) fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        mut model: Model<BookStore>,
    ) -> Result<Model<BookStore>> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut book_watcher = if model.watch_enabled {
            match self.make_book_watcher() {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    crate::perf::log_event(
                        "watcher.error",
                        format!("failed path={} err={err}", model.book_path.display()),
                    );
                    None
                }
            }
        } else {
            None
        };
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if model.pump_loads() {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(elapsed_ms(start)) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                model = update(model, Message::Resize(width, height));
                needs_render = true;
            }

            if book_watcher
                .as_mut()
                .is_some_and(BookWatcher::take_change_ready)
            {
                model = update(model, Message::BookChanged);
                Self::handle_message_side_effects(&mut model, Message::BookChanged);
                needs_render = true;
            }

            model.set_resize_pending(resize_debouncer.is_pending());

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else if model.is_loading() {
                20
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Coalesce key repeat bursts into a single render.
                let mut handled = 0_u32;
                loop {
                    let event_ms = elapsed_ms(start);
                    let msg = handle_event(
                        &event::read()?,
                        model.help_visible,
                        event_ms,
                        &mut resize_debouncer,
                    );
                    if let Some(msg) = msg {
                        handled += 1;
                        crate::perf::log_event(
                            "event.message",
                            format!("frame={frame_idx} msg={msg:?}"),
                        );
                        model = update(model, msg);
                        Self::handle_message_side_effects(&mut model, msg);
                        needs_render = true;
                    }
                    if model.should_quit || !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
                if handled > 1 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} handled={handled}"),
                    );
                }
            }

            if model.should_quit {
                break;
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(&model, frame))?;
                let cursor = model.reader.cursor();
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3} chapter={} page={}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0,
                        cursor.chapter,
                        cursor.page,
                    ),
                );
                needs_render = false;
            }
        }
        Ok(model)
    }
}
