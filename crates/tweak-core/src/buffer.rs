//! Text buffer — the storage behind a view.
//!
//! A `Buffer` wraps a [`ropey::Rope`] and exposes it through char offsets
//! ([`Point`]) and [`Region`]s, which is the coordinate system every command
//! speaks.
//!
//! # Design choices
//!
//! - **Line endings are normalized to `\n` on load.** The detected style is
//!   remembered and restored on save, so offsets never have to account for a
//!   two-char `\r\n` terminator. ropey is built without `unicode_lines`, so
//!   `\n` is the only line break it knows about.
//!
//! - **Lines exclude their terminator.** [`line_region`](Buffer::line_region)
//!   covers the visible content only; [`full_line_region`](Buffer::full_line_region)
//!   includes the trailing `\n` when there is one.
//!
//! - **No undo here.** Edit history is tracked by the view that owns the
//!   buffer (see [`crate::history`]).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ropey::Rope;

use crate::region::{Point, Region};

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file.
///
/// Detected on load by scanning the first occurrence. Defaults to `Lf` for
/// new buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    /// The string representation of this line ending.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the line ending style from its first occurrence in `text`.
    /// Returns `Lf` if there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => return Self::Lf,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => return Self::CrLf,
                b'\r' => return Self::Cr,
                _ => {}
            }
        }
        Self::Lf
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A text buffer backed by a rope.
///
/// Tracks the text, the file it came from (if any), whether it changed since
/// the last save, and how many edits it has seen in total. The change count
/// never decreases; commands use it to detect stale caches.
pub struct Buffer {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
    change_count: u64,
    line_ending: LineEnding,
}

impl Buffer {
    // ── Construction ─────────────────────────────────────────────────────

    /// Create an empty buffer with no file path.
    #[must_use]
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer from a string. Line endings are normalized to `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        let rope = if line_ending == LineEnding::Lf && !text.contains('\r') {
            Rope::from_str(text)
        } else {
            Rope::from_str(&normalize_line_endings(text, "\n"))
        };
        Self {
            rope,
            path: None,
            modified: false,
            change_count: 0,
            line_ending,
        }
    }

    /// Load a buffer from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid UTF-8.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut buf = Self::from_text(&text);
        buf.path = Some(path.to_path_buf());
        Ok(buf)
    }

    // ── Size ─────────────────────────────────────────────────────────────

    /// Total number of chars. Valid offsets are `0..=size()`.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.rope.len_chars()
    }

    /// True when the buffer contains no text.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of lines. An empty buffer has one (empty) line and a
    /// buffer ending with `\n` has a trailing empty line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    // ── Lines ────────────────────────────────────────────────────────────

    /// The 0-indexed row containing `pt`. Offsets past the end clamp to the
    /// last row.
    #[must_use]
    pub fn row_of(&self, pt: Point) -> usize {
        self.rope.char_to_line(pt.min(self.size()))
    }

    /// The content of row `row`, excluding its line terminator. Rows past
    /// the end clamp to the last row.
    #[must_use]
    pub fn line_region(&self, row: usize) -> Region {
        let row = row.min(self.line_count() - 1);
        let start = self.rope.line_to_char(row);
        let line = self.rope.line(row);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
        }
        Region::new(start, start + len)
    }

    /// Row `row` including its trailing `\n`, if it has one.
    #[must_use]
    pub fn full_line_region(&self, row: usize) -> Region {
        let row = row.min(self.line_count() - 1);
        let start = self.rope.line_to_char(row);
        Region::new(start, start + self.rope.line(row).len_chars())
    }

    /// The line containing `pt`, excluding its terminator.
    ///
    /// An offset sitting on a `\n` belongs to the line that `\n` ends.
    #[inline]
    #[must_use]
    pub fn line(&self, pt: Point) -> Region {
        self.line_region(self.row_of(pt))
    }

    /// Lines intersecting `region`, in buffer order.
    ///
    /// That is the line containing `region.begin()` plus every following line
    /// whose first offset is strictly before `region.end()`. An empty region
    /// yields exactly the one line containing it, and an empty buffer yields
    /// the single line `[0, 0)`.
    #[must_use]
    pub fn lines(&self, region: Region) -> Vec<Region> {
        let first = self.row_of(region.begin());
        let mut lines = vec![self.line_region(first)];
        for row in first + 1..self.line_count() {
            let line = self.line_region(row);
            if line.begin() >= region.end() {
                break;
            }
            lines.push(line);
        }
        lines
    }

    /// Convert an offset to `(row, col)`, both 0-indexed.
    #[must_use]
    pub fn rowcol(&self, pt: Point) -> (usize, usize) {
        let pt = pt.min(self.size());
        let row = self.rope.char_to_line(pt);
        (row, pt - self.rope.line_to_char(row))
    }

    /// Convert `(row, col)` to an offset. The row clamps to the last line and
    /// the column to the end of that line's content.
    #[must_use]
    pub fn text_point(&self, row: usize, col: usize) -> Point {
        let line = self.line_region(row);
        (line.begin() + col).min(line.end())
    }

    // ── Text access ──────────────────────────────────────────────────────

    /// The text covered by `region`, clamped to the buffer.
    #[must_use]
    pub fn substr(&self, region: Region) -> String {
        let size = self.size();
        let start = region.begin().min(size);
        let end = region.end().min(size);
        self.rope.slice(start..end).to_string()
    }

    /// The full text. Allocates.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // ── Editing ──────────────────────────────────────────────────────────

    /// Insert `text` at `pt` and return the number of chars inserted.
    ///
    /// `pt` is clamped to the buffer. `\r\n` and `\r` in `text` become `\n`.
    pub fn insert(&mut self, pt: Point, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let pt = pt.min(self.size());
        let normalized;
        let text = if text.contains('\r') {
            normalized = normalize_line_endings(text, "\n");
            normalized.as_str()
        } else {
            text
        };
        self.rope.insert(pt, text);
        self.touch();
        text.chars().count()
    }

    /// Remove the text covered by `region` and return it.
    pub fn erase(&mut self, region: Region) -> String {
        let size = self.size();
        let start = region.begin().min(size);
        let end = region.end().min(size);
        if start == end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.touch();
        removed
    }

    /// Replace the text covered by `region`. Returns the removed text.
    pub fn replace(&mut self, region: Region, text: &str) -> String {
        let removed = self.erase(region);
        self.insert(region.begin(), text);
        removed
    }

    const fn touch(&mut self) {
        self.modified = true;
        self.change_count += 1;
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    /// The file path this buffer is associated with, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Associate the buffer with a file path.
    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// True if the buffer changed since the last save (or creation).
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Number of edits applied since creation.
    #[inline]
    #[must_use]
    pub const fn change_count(&self) -> u64 {
        self.change_count
    }

    /// The detected (or configured) line ending style.
    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // ── File I/O ─────────────────────────────────────────────────────────

    /// Save to the associated path, restoring the original line endings.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set or the write fails.
    pub fn save(&mut self) -> io::Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"))?;
        self.save_as(&path)
    }

    /// Save to `path` and make it the associated path.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_as(&mut self, path: &Path) -> io::Result<()> {
        let text = self.rope.to_string();
        let text = match self.line_ending {
            LineEnding::Lf => text,
            ending => normalize_line_endings(&text, ending.as_str()),
        };
        fs::write(path, text)?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.size())
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert every `\r\n`, `\r` and `\n` in `text` to `target`.
fn normalize_line_endings(text: &str, target: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                result.push_str(target);
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' => result.push_str(target),
            _ => result.push(ch),
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── LineEnding ───────────────────────────────────────────────────────

    #[test]
    fn line_ending_detect() {
        assert_eq!(LineEnding::detect("a\nb\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\r\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb\r"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("none"), LineEnding::Lf);
    }

    #[test]
    fn line_ending_first_wins() {
        assert_eq!(LineEnding::detect("a\nb\r\nc"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
    }

    // ── Construction ─────────────────────────────────────────────────────

    #[test]
    fn new_buffer_has_one_empty_line() {
        let buf = Buffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.lines(Region::new(0, 0)), vec![Region::new(0, 0)]);
    }

    #[test]
    fn crlf_is_normalized() {
        let buf = Buffer::from_text("ab\r\ncd\r\n");
        assert_eq!(buf.contents(), "ab\ncd\n");
        assert_eq!(buf.size(), 6);
        assert_eq!(buf.line_ending(), LineEnding::CrLf);
    }

    // ── Lines ────────────────────────────────────────────────────────────

    #[test]
    fn line_regions_exclude_terminator() {
        let buf = Buffer::from_text("a\n\nb\nc\n");
        assert_eq!(buf.line_region(0), Region::new(0, 1));
        assert_eq!(buf.line_region(1), Region::new(2, 2));
        assert_eq!(buf.line_region(2), Region::new(3, 4));
        assert_eq!(buf.line_region(3), Region::new(5, 6));
        assert_eq!(buf.line_region(4), Region::new(7, 7));
    }

    #[test]
    fn full_line_includes_terminator() {
        let buf = Buffer::from_text("ab\ncd");
        assert_eq!(buf.full_line_region(0), Region::new(0, 3));
        assert_eq!(buf.full_line_region(1), Region::new(3, 5));
    }

    #[test]
    fn line_at_newline_belongs_to_previous_line() {
        let buf = Buffer::from_text("ab\ncd");
        assert_eq!(buf.line(2), Region::new(0, 2));
        assert_eq!(buf.line(3), Region::new(3, 5));
    }

    #[test]
    fn lines_excludes_line_starting_at_region_end() {
        let buf = Buffer::from_text("a\n\nb\nc\n");
        assert_eq!(
            buf.lines(Region::new(0, 5)),
            vec![Region::new(0, 1), Region::new(2, 2), Region::new(3, 4)]
        );
        // The trailing empty line begins at 7 == size, so it is not included.
        assert_eq!(
            buf.lines(Region::new(5, 7)),
            vec![Region::new(5, 6)]
        );
    }

    #[test]
    fn lines_of_empty_region_is_containing_line() {
        let buf = Buffer::from_text("one\ntwo");
        assert_eq!(buf.lines(Region::point(5)), vec![Region::new(4, 7)]);
        assert_eq!(buf.lines(Region::point(7)), vec![Region::new(4, 7)]);
    }

    #[test]
    fn rowcol_and_text_point() {
        let buf = Buffer::from_text("hello\nwörld\n");
        assert_eq!(buf.rowcol(0), (0, 0));
        assert_eq!(buf.rowcol(7), (1, 1));
        assert_eq!(buf.rowcol(12), (2, 0));
        assert_eq!(buf.text_point(1, 2), 8);
        // Columns clamp to the line content.
        assert_eq!(buf.text_point(0, 99), 5);
        // Rows clamp to the last line.
        assert_eq!(buf.text_point(99, 0), 12);
    }

    // ── Editing ──────────────────────────────────────────────────────────

    #[test]
    fn insert_and_erase() {
        let mut buf = Buffer::from_text("hello");
        assert_eq!(buf.insert(5, " world"), 6);
        assert_eq!(buf.contents(), "hello world");
        assert!(buf.is_modified());
        assert_eq!(buf.erase(Region::new(11, 5)), " world");
        assert_eq!(buf.contents(), "hello");
        assert_eq!(buf.change_count(), 2);
    }

    #[test]
    fn empty_edits_do_not_count() {
        let mut buf = Buffer::from_text("x");
        buf.insert(0, "");
        buf.erase(Region::point(1));
        assert_eq!(buf.change_count(), 0);
        assert!(!buf.is_modified());
    }

    #[test]
    fn replace_swaps_text() {
        let mut buf = Buffer::from_text("a <cur> b");
        let removed = buf.replace(Region::new(2, 7), "<current file>");
        assert_eq!(removed, "<cur>");
        assert_eq!(buf.contents(), "a <current file> b");
    }

    #[test]
    fn substr_is_clamped() {
        let buf = Buffer::from_text("abc");
        assert_eq!(buf.substr(Region::new(1, 10)), "bc");
        assert_eq!(buf.substr(Region::new(2, 0)), "ab");
    }

    // ── File I/O ─────────────────────────────────────────────────────────

    #[test]
    fn save_restores_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        fs::write(&path, "a\r\nb\r\n").unwrap();

        let mut buf = Buffer::from_file(&path).unwrap();
        buf.insert(1, "x");
        buf.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ax\r\nb\r\n");
        assert!(!buf.is_modified());
    }

    #[test]
    fn save_without_path_fails() {
        let mut buf = Buffer::from_text("x");
        assert_eq!(buf.save().unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
