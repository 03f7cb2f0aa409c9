//! Saved reading positions, one per book.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Where a reader left off.
///
/// `offset` is the byte offset of the page start within its chapter and
/// takes precedence over `page` when restoring, since page numbers change
/// with the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPosition {
    pub chapter: usize,
    pub page: usize,
    #[serde(default)]
    pub offset: usize,
}

/// A JSON file mapping canonical book paths to positions.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

pub fn default_progress_path() -> PathBuf {
    crate::config::global_config_path().with_file_name("progress.json")
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved position for `book`, if any.
    ///
    /// # Errors
    /// Returns an error if the progress file exists but cannot be read or parsed.
    pub fn load(&self, book: &Path) -> Result<Option<ReadingPosition>> {
        let mut entries = self.read_all()?;
        Ok(entries.remove(&book_key(book)))
    }

    /// Record `position` for `book`, keeping other books' entries.
    ///
    /// # Errors
    /// Returns an error if the progress file cannot be read or written.
    pub fn save(&self, book: &Path, position: ReadingPosition) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(book_key(book), position);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&entries).context("Failed to encode progress")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write progress {}", self.path.display()))?;
        tracing::debug!(book = %book.display(), ?position, "saved reading position");
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, ReadingPosition>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read progress {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse progress {}", self.path.display()))
    }
}

fn book_key(book: &Path) -> String {
    book.canonicalize()
        .unwrap_or_else(|_| book.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_has_no_position() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        assert_eq!(store.load(Path::new("book.txt")).unwrap(), None);
    }

    #[test]
    fn test_save_then_load_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let book = dir.path().join("book.txt");
        fs::write(&book, "text").unwrap();
        let store = ProgressStore::new(dir.path().join("state").join("progress.json"));
        let position = ReadingPosition {
            chapter: 3,
            page: 7,
            offset: 1200,
        };

        store.save(&book, position).unwrap();

        let reopened = ProgressStore::new(store.path());
        assert_eq!(reopened.load(&book).unwrap(), Some(position));
    }

    #[test]
    fn test_books_are_kept_separately() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "a").unwrap();
        fs::write(&second, "b").unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let a = ReadingPosition {
            chapter: 1,
            page: 0,
            offset: 0,
        };
        let b = ReadingPosition {
            chapter: 0,
            page: 4,
            offset: 90,
        };

        store.save(&first, a).unwrap();
        store.save(&second, b).unwrap();

        assert_eq!(store.load(&first).unwrap(), Some(a));
        assert_eq!(store.load(&second).unwrap(), Some(b));
    }

    #[test]
    fn test_relative_and_canonical_paths_share_an_entry() {
        let dir = tempdir().unwrap();
        let book = dir.path().join("book.txt");
        fs::write(&book, "a").unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let position = ReadingPosition {
            chapter: 2,
            page: 1,
            offset: 10,
        };

        store.save(&dir.path().join(".").join("book.txt"), position).unwrap();

        assert_eq!(store.load(&book).unwrap(), Some(position));
    }

    #[test]
    fn test_offset_defaults_when_missing() {
        let position: ReadingPosition = serde_json::from_str(r#"{"chapter":1,"page":2}"#).unwrap();
        assert_eq!(position.offset, 0);
    }

    #[test]
    fn test_corrupt_file_reports_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "{not json").unwrap();
        let store = ProgressStore::new(&path);
        assert!(store.load(Path::new("book.txt")).is_err());
    }
}
