//! View — an in-memory editor view.
//!
//! A `View` owns a [`Buffer`], its [`SelectionSet`], undo [`History`] and a
//! small amount of presentation state (viewport, status entries, named
//! regions). It implements [`TextView`], so every command in this crate can
//! run against it. The CLI harness and the tests use it as the editor.
//!
//! # Viewport
//!
//! The viewport is `height` rows starting at `top_line`. There is no
//! horizontal scrolling: commands only ever need to know which rows are on
//! screen.
//!
//! ```text
//! Buffer              View
//! ┌──────────┐     ┌──────────────┐
//! │ row 0    │     │              │
//! │ row 1    │ ──▶ │ top_line     │ ┐
//! │ row 2    │     │ ...          │ │ height rows
//! │ ...      │     │              │ ┘
//! └──────────┘     └──────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::buffer::Buffer;
use crate::history::History;
use crate::host::{Element, TextView};
use crate::region::{Point, Region};
use crate::selection::SelectionSet;
use crate::settings::Settings;

/// Rows on screen when nothing else is configured.
pub const DEFAULT_HEIGHT: usize = 40;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

pub struct View {
    /// Unique for the lifetime of the process.
    id: u64,
    name: String,
    buffer: Buffer,
    sel: SelectionSet,
    history: History,

    /// First visible row (0-indexed).
    top_line: usize,

    /// Number of visible rows.
    height: usize,

    settings: Settings,
    element: Element,
    syntax: Option<String>,

    /// Editor group (pane) the view sits in.
    group: usize,
    status: BTreeMap<String, String>,
    regions: HashMap<String, Vec<Region>>,
    reference_document: Option<String>,
    scratch: bool,
    read_only: bool,
}

impl View {
    // ── Construction ─────────────────────────────────────────────────────

    /// An empty view with a caret at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(Buffer::new())
    }

    /// A view over `text` with a caret at 0.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::with_buffer(Buffer::from_text(text))
    }

    /// A view over the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let mut view = Self::with_buffer(Buffer::from_file(path)?);
        view.name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(view)
    }

    fn with_buffer(buffer: Buffer) -> Self {
        Self {
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            name: String::new(),
            buffer,
            sel: SelectionSet::caret(0),
            history: History::new(),
            top_line: 0,
            height: DEFAULT_HEIGHT,
            settings: Settings::default(),
            element: Element::Editor,
            syntax: None,
            group: 0,
            status: BTreeMap::new(),
            regions: HashMap::new(),
            reference_document: None,
            scratch: false,
            read_only: false,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    /// Set the viewport height (minimum 1 row).
    #[must_use]
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height.max(1);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Associate the view with a file. The view takes the file's name when
    /// it has none yet.
    pub fn set_file_path(&mut self, path: PathBuf) {
        if self.name.is_empty() {
            if let Some(name) = path.file_name() {
                self.name = name.to_string_lossy().into_owned();
            }
        }
        self.buffer.set_path(path);
    }

    #[inline]
    #[must_use]
    pub fn syntax(&self) -> Option<&str> {
        self.syntax.as_deref()
    }

    /// Set the syntax the view is highlighted and configured as.
    pub fn assign_syntax(&mut self, syntax: impl Into<String>) {
        self.syntax = Some(syntax.into());
    }

    #[inline]
    #[must_use]
    pub const fn group(&self) -> usize {
        self.group
    }

    pub const fn set_group(&mut self, group: usize) {
        self.group = group;
    }

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    pub const fn set_top_line(&mut self, row: usize) {
        self.top_line = row;
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// A status bar entry, if set.
    #[must_use]
    pub fn status(&self, key: &str) -> Option<&str> {
        self.status.get(key).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub const fn is_scratch(&self) -> bool {
        self.scratch
    }

    /// Scratch views close without asking to save.
    pub const fn set_scratch(&mut self, scratch: bool) {
        self.scratch = scratch;
    }

    #[inline]
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Read-only views silently ignore edits.
    pub const fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// True when the buffer has unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Attach named regions (replacing any previous ones under `key`).
    pub fn add_regions(&mut self, key: impl Into<String>, regions: Vec<Region>) {
        self.regions.insert(key.into(), regions);
    }

    /// The text the incremental diff gutter compares against.
    #[must_use]
    pub fn reference_document(&self) -> Option<&str> {
        self.reference_document.as_deref()
    }

    pub fn set_reference_document(&mut self, text: impl Into<String>) {
        self.reference_document = Some(text.into());
    }

    // ── History ──────────────────────────────────────────────────────────

    /// Open an undo transaction. Edits until [`end_edit`](Self::end_edit)
    /// undo as one step.
    pub fn begin_edit(&mut self) {
        self.history.begin(self.sel.as_slice());
    }

    /// Close the undo transaction opened by [`begin_edit`](Self::begin_edit).
    pub fn end_edit(&mut self) {
        self.history.commit(self.sel.as_slice());
    }

    /// Undo the last edit. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.buffer) {
            Some(selections) => {
                self.sel.set(selections);
                self.sel.clamp(self.buffer.size());
                true
            }
            None => false,
        }
    }

    /// Redo the last undone edit. Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.buffer) {
            Some(selections) => {
                self.sel.set(selections);
                self.sel.clamp(self.buffer.size());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn clear_undo_stack(&mut self) {
        self.history.clear();
    }

    // ── File I/O ─────────────────────────────────────────────────────────

    /// Save the buffer to its file.
    ///
    /// # Errors
    ///
    /// Returns an error if the view has no file or the write fails.
    pub fn save(&mut self) -> io::Result<()> {
        self.buffer.save()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("buffer", &self.buffer)
            .field("sel", &self.sel)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

impl TextView for View {
    fn size(&self) -> usize {
        self.buffer.size()
    }

    fn lines(&self, region: Region) -> Vec<Region> {
        self.buffer.lines(region)
    }

    fn line(&self, pt: Point) -> Region {
        self.buffer.line(pt)
    }

    fn full_line(&self, pt: Point) -> Region {
        self.buffer.full_line_region(self.buffer.row_of(pt))
    }

    fn substr(&self, region: Region) -> String {
        self.buffer.substr(region)
    }

    fn rowcol(&self, pt: Point) -> (usize, usize) {
        self.buffer.rowcol(pt)
    }

    fn text_point(&self, row: usize, col: usize) -> Point {
        self.buffer.text_point(row, col)
    }

    fn change_count(&self) -> u64 {
        self.buffer.change_count()
    }

    fn sel(&self) -> &SelectionSet {
        &self.sel
    }

    fn sel_mut(&mut self) -> &mut SelectionSet {
        &mut self.sel
    }

    fn show(&mut self, region: Region) {
        let row = self.buffer.row_of(region.b);
        if row < self.top_line {
            self.top_line = row;
        }
        if row >= self.top_line + self.height {
            self.top_line = row + 1 - self.height;
        }
    }

    fn visible_region(&self) -> Region {
        let last = self.buffer.line_count() - 1;
        let top = self.top_line.min(last);
        let bottom = (self.top_line + self.height - 1).min(last);
        Region::new(
            self.buffer.line_region(top).begin(),
            self.buffer.line_region(bottom).end(),
        )
    }

    fn insert(&mut self, pt: Point, text: &str) -> usize {
        if self.read_only {
            tracing::debug!(view = %self.name, "ignoring insert into read-only view");
            return 0;
        }
        let pt = pt.min(self.buffer.size());
        let len = self.buffer.insert(pt, text);
        if len == 0 {
            return 0;
        }
        let inserted = self.buffer.substr(Region::new(pt, pt + len));
        self.history.record_insert(pt, &inserted);

        let shift = |o: Point| if o >= pt { o + len } else { o };
        let shifted = self
            .sel
            .iter()
            .map(|r| Region::new(shift(r.a), shift(r.b)))
            .collect();
        self.sel.set(shifted);
        len
    }

    fn erase(&mut self, region: Region) {
        if self.read_only {
            tracing::debug!(view = %self.name, "ignoring erase in read-only view");
            return;
        }
        let begin = region.begin().min(self.buffer.size());
        let removed = self.buffer.erase(region);
        if removed.is_empty() {
            return;
        }
        self.history.record_erase(begin, &removed);

        let len = removed.chars().count();
        let end = begin + len;
        let shift = |o: Point| {
            if o >= end {
                o - len
            } else if o > begin {
                begin
            } else {
                o
            }
        };
        let shifted = self
            .sel
            .iter()
            .map(|r| Region::new(shift(r.a), shift(r.b)))
            .collect();
        self.sel.set(shifted);
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn element(&self) -> Element {
        self.element
    }

    fn file_name(&self) -> Option<&Path> {
        self.buffer.path()
    }

    fn get_regions(&self, key: &str) -> Vec<Region> {
        self.regions.get(key).cloned().unwrap_or_default()
    }

    fn set_status(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.status.remove(key);
        } else {
            self.status.insert(key.to_string(), value.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
