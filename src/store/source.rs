//! Chapter text sources.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::SourceError;

/// Chapter heading lines in plain-text books.
static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t\u{3000}]*(?:(?:chapter|part|book)[ \t]+(?:\d+|[ivxlcdm]+)\b[^\n]*|第[0-9零一二三四五六七八九十百千万两]+[章回节卷][^\n]*|(?:prologue|epilogue)\b[^\n]*)$",
    )
    .expect("heading pattern is valid")
});

/// Longest line (in chars) still considered a heading.
const MAX_HEADING_CHARS: usize = 80;

/// Fetches raw chapter text.
///
/// Sources are shared with loader threads, so fetching takes `&self`.
pub trait ChapterSource: Send + Sync {
    fn chapter_count(&self) -> usize;

    fn title(&self, chapter: usize) -> Option<&str>;

    /// Fetch the full text of `chapter`.
    ///
    /// # Errors
    /// Returns an error if the chapter is out of range or cannot be read.
    fn fetch(&self, chapter: usize) -> Result<String, SourceError>;
}

/// Open `path` as a book: a directory of chapter files or a single text file.
///
/// # Errors
/// Returns an error if the path cannot be read or contains no chapters.
pub fn open_source(path: &Path) -> Result<Arc<dyn ChapterSource>, SourceError> {
    if path.is_dir() {
        Ok(Arc::new(DirectorySource::open(path)?))
    } else {
        Ok(Arc::new(TextFileSource::open(path)?))
    }
}

/// Every regular, non-hidden file in a directory is one chapter, in name order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    files: Vec<PathBuf>,
    titles: Vec<String>,
}

impl DirectorySource {
    /// List chapter files in `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be listed or has no files.
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let entries = fs::read_dir(dir).map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| {
                e.file_type().ok().is_some_and(|ft| ft.is_file())
                    && !e.file_name().to_string_lossy().starts_with('.')
            })
            .map(|e| e.path())
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(SourceError::Empty {
                path: dir.to_path_buf(),
            });
        }
        let titles = files
            .iter()
            .map(|f| {
                f.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect();
        Ok(Self { files, titles })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl ChapterSource for DirectorySource {
    fn chapter_count(&self) -> usize {
        self.files.len()
    }

    fn title(&self, chapter: usize) -> Option<&str> {
        self.titles.get(chapter).map(String::as_str)
    }

    fn fetch(&self, chapter: usize) -> Result<String, SourceError> {
        let path = self.files.get(chapter).ok_or(SourceError::OutOfRange {
            chapter,
            count: self.files.len(),
        })?;
        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8 { path: path.clone() })
    }
}

/// One plain-text file split into chapters at heading lines.
///
/// Text before the first heading becomes its own chapter. A file with no
/// headings is a single chapter.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    text: String,
    chapters: Vec<(String, Range<usize>)>,
}

impl TextFileSource {
    /// Read and split the file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not UTF-8.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8 {
            path: path.to_path_buf(),
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::from_text(&name, text))
    }

    /// Split in-memory text; `name` titles a book without headings.
    pub fn from_text(name: &str, text: String) -> Self {
        let headings: Vec<Range<usize>> = HEADING_RE
            .find_iter(&text)
            .filter(|m| m.as_str().chars().count() <= MAX_HEADING_CHARS)
            .map(|m| m.range())
            .collect();

        let mut chapters = Vec::new();
        match headings.first() {
            None => chapters.push((name.to_string(), 0..text.len())),
            Some(first) => {
                if !text[..first.start].trim().is_empty() {
                    chapters.push(("Preface".to_string(), 0..first.start));
                }
                for (i, heading) in headings.iter().enumerate() {
                    let end = headings.get(i + 1).map_or(text.len(), |next| next.start);
                    let title = text[heading.clone()].trim().to_string();
                    chapters.push((title, heading.start..end));
                }
            }
        }
        tracing::debug!(chapters = chapters.len(), "split text file into chapters");
        Self { text, chapters }
    }
}

impl ChapterSource for TextFileSource {
    fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    fn title(&self, chapter: usize) -> Option<&str> {
        self.chapters.get(chapter).map(|(title, _)| title.as_str())
    }

    fn fetch(&self, chapter: usize) -> Result<String, SourceError> {
        let (_, range) = self.chapters.get(chapter).ok_or(SourceError::OutOfRange {
            chapter,
            count: self.chapters.len(),
        })?;
        Ok(self.text[range.clone()].to_string())
    }
}
