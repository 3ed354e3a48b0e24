//! The host interface commands are written against.
//!
//! Every text command in this crate talks to the editor through
//! [`TextView`]: line lookup, substring extraction, buffer size, selection
//! read/replace, and a handful of edits. Nothing else about the editor leaks
//! through, so a command can run against the in-memory [`View`] in tests and
//! against a real editor binding unchanged.
//!
//! Only the primitives are required. Derived lookups (`line`, `full_line`)
//! have default implementations built on [`lines`](TextView::lines).
//!
//! [`View`]: crate::view::View

use std::path::Path;

use crate::region::{Point, Region};
use crate::selection::SelectionSet;
use crate::settings::Settings;

/// Which widget a view is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Element {
    /// A regular editor tab.
    #[default]
    Editor,
    /// The "Where:" field of the find-in-files panel.
    LocationInput,
    /// An output panel (build output, console-like panels).
    OutputPanel,
}

pub trait TextView {
    // ── Text ─────────────────────────────────────────────────────────────

    /// Total number of chars in the buffer.
    fn size(&self) -> usize;

    /// Lines intersecting `region`, in buffer order, each excluding its
    /// terminator. Always contains at least the line holding
    /// `region.begin()`; lines starting exactly at a non-empty region's end
    /// are not included.
    fn lines(&self, region: Region) -> Vec<Region>;

    /// The text covered by `region`.
    fn substr(&self, region: Region) -> String;

    /// `(row, col)` of `pt`, both 0-indexed.
    fn rowcol(&self, pt: Point) -> (usize, usize);

    /// Offset of `(row, col)`, clamped to the buffer.
    fn text_point(&self, row: usize, col: usize) -> Point;

    /// The line containing `pt`, excluding its terminator.
    fn line(&self, pt: Point) -> Region {
        self.lines(Region::point(pt))
            .first()
            .copied()
            .unwrap_or_default()
    }

    /// The line containing `pt`, including its trailing newline if any.
    fn full_line(&self, pt: Point) -> Region {
        let line = self.line(pt);
        let end = if line.end() < self.size() {
            line.end() + 1
        } else {
            line.end()
        };
        Region::new(line.begin(), end)
    }

    /// Incremented on every edit; used to invalidate cached offsets.
    fn change_count(&self) -> u64;

    // ── Selections and viewport ──────────────────────────────────────────

    fn sel(&self) -> &SelectionSet;

    fn sel_mut(&mut self) -> &mut SelectionSet;

    /// Scroll the viewport so `region` is visible.
    fn show(&mut self, region: Region);

    /// The part of the buffer currently on screen.
    fn visible_region(&self) -> Region;

    // ── Edits ────────────────────────────────────────────────────────────

    /// Insert `text` at `pt`; returns the number of chars inserted.
    /// Selections at or after `pt` shift right.
    fn insert(&mut self, pt: Point, text: &str) -> usize;

    /// Remove the text covered by `region`. Selections inside collapse to
    /// its begin; selections after it shift left.
    fn erase(&mut self, region: Region);

    /// Replace the text covered by `region` with `text`.
    fn replace(&mut self, region: Region, text: &str) {
        self.erase(region);
        self.insert(region.begin(), text);
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    /// Effective settings for this view.
    fn settings(&self) -> &Settings;

    fn element(&self) -> Element {
        Element::Editor
    }

    fn file_name(&self) -> Option<&Path> {
        None
    }

    /// Named regions attached by other tools (`"match"` for find results).
    fn get_regions(&self, _key: &str) -> Vec<Region> {
        Vec::new()
    }

    /// Set (or clear, with an empty value) a status bar entry.
    fn set_status(&mut self, key: &str, value: &str);
}
