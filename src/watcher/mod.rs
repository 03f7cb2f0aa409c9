//! Book change detection for `--watch`.
//!
//! A single-file book is watched through its parent directory; a chapter
//! directory is watched directly and any visible entry inside it counts.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    File { path: PathBuf, name: Option<OsString> },
    Directory(PathBuf),
}

/// Watches a book (file or chapter directory) and reports debounced changes.
pub struct BookWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target: Target,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl BookWatcher {
    /// Start watching the book at `path`.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths from the OS are canonical.
        let path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target = if path.is_dir() {
            Target::Directory(path)
        } else {
            let name = path.file_name().map(std::ffi::OsStr::to_os_string);
            Target::File { path, name }
        };
        let watch_root = watch_root_for(&target);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target,
            debounce,
            pending_since: None,
        })
    }

    /// The canonical path of the watched book.
    pub fn target_path(&self) -> &Path {
        match &self.target {
            Target::File { path, .. } | Target::Directory(path) => path,
        }
    }

    /// Returns true once a debounced change is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(ev) => {
                    ignored += 1;
                    crate::perf::log_event(
                        "watcher.ignored",
                        format!("kind={:?} paths={:?}", ev.kind, ev.paths),
                    );
                }
                Err(err) => {
                    tracing::warn!(%err, "watch error");
                    crate::perf::log_event("watcher.error", err.to_string());
                }
            }
        }

        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={} root={}",
                    self.target_path().display(),
                    self.watch_root.display(),
                ),
            );
        }
        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| match &self.target {
            Target::File { path: target, name } => {
                path == &self.watch_root
                    || path == target
                    || name
                        .as_ref()
                        .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
            }
            Target::Directory(dir) => {
                path == dir
                    || (path.parent() == Some(dir.as_path()) && !is_hidden(path))
            }
        })
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn watch_root_for(target: &Target) -> PathBuf {
    match target {
        Target::Directory(dir) => dir.clone(),
        Target::File { path, .. } => path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    fn wait_for_change(watcher: &mut BookWatcher) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if watcher.take_change_ready() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    fn test_parent_directory_event_is_relevant_for_book_file() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("book.txt");
        std::fs::write(&path, "Chapter 1\n").expect("write");
        let watcher = BookWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event(vec![canonical_dir])));
    }

    #[test]
    fn test_sibling_file_is_not_relevant_for_book_file() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("book.txt");
        std::fs::write(&path, "text").expect("write");
        let watcher = BookWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(!watcher.is_relevant(&event(vec![canonical_dir.join("notes.txt")])));
    }

    #[test]
    fn test_directory_book_ignores_hidden_entries() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        std::fs::write(canonical_dir.join("01.txt"), "one").expect("write");
        let watcher = BookWatcher::new(&canonical_dir, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event(vec![canonical_dir.join("02.txt")])));
        assert!(!watcher.is_relevant(&event(vec![canonical_dir.join(".01.txt.swp")])));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let target = Target::File {
            path: PathBuf::from("book.txt"),
            name: Some(OsString::from("book.txt")),
        };
        assert_eq!(watch_root_for(&target), PathBuf::from("."));
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().canonicalize().expect("canonicalize").join("book.txt");
        std::fs::write(&path, "original").expect("write");
        let mut watcher = BookWatcher::new(&path, Duration::from_millis(50)).expect("watcher");

        // Some backends need a moment to register the watch.
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, "modified").expect("write");

        assert!(wait_for_change(&mut watcher), "modification should be detected");
    }

    #[test]
    fn test_new_chapter_file_in_directory_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        std::fs::write(canonical_dir.join("01.txt"), "one").expect("write");
        let mut watcher =
            BookWatcher::new(&canonical_dir, Duration::from_millis(50)).expect("watcher");

        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(canonical_dir.join("02.txt"), "two").expect("write");

        assert!(wait_for_change(&mut watcher), "new chapter should be detected");
    }
}
