//! Splitting chapter text into pages.
//!
//! Splitting is a pure function of the text and the layout: the same
//! inputs always produce the same page boundaries, so saved reading
//! positions stay valid across restarts with unchanged settings.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

use super::{LayoutConstraints, Page, PageKey};

/// Split chapter text into pages for the given layout.
///
/// The result is never empty: empty text yields a single empty page.
/// Concatenating the text of every page reproduces `text` exactly.
///
/// # Example
///
/// ```
/// use folio::pagination::{split, LayoutConstraints};
///
/// let layout = LayoutConstraints::new(10, 2);
/// let pages = split(0, "one two three four five", &layout);
/// assert_eq!(pages.len(), 2);
/// assert_eq!(pages.iter().map(|p| p.text()).collect::<String>(), "one two three four five");
/// ```
pub fn split(chapter: usize, text: &str, layout: &LayoutConstraints) -> Vec<Page> {
    let lines = wrap_lines(text, layout.text_width());
    if lines.is_empty() {
        return vec![Page::new(
            PageKey::new(chapter, 0),
            0,
            text.to_string(),
            Vec::new(),
        )];
    }

    lines
        .chunks(layout.lines_per_page())
        .enumerate()
        .map(|(index, chunk)| {
            let start = chunk[0].start;
            let end = chunk[chunk.len() - 1].end;
            let ranges = chunk
                .iter()
                .map(|range| range.start - start..range.end - start)
                .collect();
            Page::new(
                PageKey::new(chapter, index),
                start,
                text[start..end].to_string(),
                ranges,
            )
        })
        .collect()
}

/// Find the page that contains byte `offset` of the chapter text.
///
/// Offsets past the end resolve to the last page.
pub fn page_containing_offset(pages: &[Page], offset: usize) -> usize {
    pages
        .iter()
        .position(|page| offset < page.end_offset())
        .unwrap_or_else(|| pages.len().saturating_sub(1))
}

/// Wrap text into display lines no wider than `width` columns.
///
/// Returns contiguous byte ranges covering all of `text`. A line keeps
/// its trailing newline and any whitespace hanging past the edge.
pub fn wrap_lines(text: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut hard_start = 0;
    for hard_line in text.split_inclusive('\n') {
        wrap_hard_line(hard_line, hard_start, width, &mut lines);
        hard_start += hard_line.len();
    }
    lines
}

fn wrap_hard_line(line: &str, base: usize, width: usize, out: &mut Vec<Range<usize>>) {
    let mut line_start = 0;
    let mut line_width = 0;
    // Byte index just past the latest break opportunity, and the line
    // width up to that point.
    let mut last_break: Option<(usize, usize)> = None;

    for (idx, ch) in line.char_indices() {
        let next = idx + ch.len_utf8();
        if ch == '\n' || ch == '\r' {
            continue;
        }

        if ch.is_whitespace() {
            let ch_width = ch.width().unwrap_or(1);
            // Whitespace that does not fit hangs past the edge.
            if line_width + ch_width <= width {
                line_width += ch_width;
            }
            last_break = Some((next, line_width));
            continue;
        }

        let ch_width = ch.width().unwrap_or(0);
        if line_width + ch_width > width && line_width > 0 {
            if let Some((brk, brk_width)) = last_break.take()
                && brk > line_start
            {
                out.push(base + line_start..base + brk);
                line_start = brk;
                line_width -= brk_width;
            }
            if line_width + ch_width > width && line_width > 0 {
                out.push(base + line_start..base + idx);
                line_start = idx;
                line_width = 0;
            }
        }

        line_width += ch_width;
        // Wide glyphs (CJK) may break after any character.
        if ch_width >= 2 {
            last_break = Some((next, line_width));
        }
    }

    if line_start < line.len() {
        out.push(base + line_start..base + line.len());
    }
}
