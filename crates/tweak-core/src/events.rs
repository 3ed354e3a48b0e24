//! Event listeners — reactions to view lifecycle events.
//!
//! The window emits an [`Event`] whenever a view is created, loaded,
//! activated, saved, or has its selection changed. Every registered
//! [`EventListener`] sees every event; each one overrides only the hooks it
//! cares about.
//!
//! | Listener             | Events                        | Effect                                 |
//! |----------------------|-------------------------------|----------------------------------------|
//! | [`LineCount`]        | new, load, selection modified | `zzz_lines` status entry               |
//! | [`MiniDiffOnSave`]   | post save                     | reset the diff reference document      |
//! | [`CreatePath`]       | pre save                      | create missing parent directories      |
//! | [`FindResults`]      | activated                     | make "Find Results" read-only          |

use std::fmt;
use std::fs;
use std::io;

use crate::commands::mini_diff::reset_mini_diff;
use crate::host::TextView;
use crate::region::Region;
use crate::view::View;

/// Status key of the line/column indicator. Sorts last in the status bar.
pub const LINE_COUNT_STATUS: &str = "zzz_lines";

/// Name of the view that holds find-in-files output.
pub const FIND_RESULTS_NAME: &str = "Find Results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    New,
    Load,
    SelectionModified,
    Activated,
    PreSave,
    PostSave,
}

pub trait EventListener {
    fn on_new(&self, _view: &mut View) {}

    fn on_load(&self, _view: &mut View) {}

    fn on_selection_modified(&self, _view: &mut View) {}

    fn on_activated(&self, _view: &mut View) {}

    /// Runs before the buffer is written. An error aborts the save.
    ///
    /// # Errors
    ///
    /// Implementations return I/O errors that should prevent saving.
    fn on_pre_save(&self, _view: &mut View) -> io::Result<()> {
        Ok(())
    }

    fn on_post_save(&self, _view: &mut View) {}
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The listeners a window notifies, in registration order.
pub struct Listeners {
    listeners: Vec<Box<dyn EventListener>>,
}

impl Listeners {
    /// A registry with no listeners.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Notify every listener of `event` on `view`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a pre-save hook; later listeners
    /// are not run.
    pub fn emit(&self, event: Event, view: &mut View) -> io::Result<()> {
        tracing::trace!(?event, view = %view.name(), "emit");
        for listener in &self.listeners {
            match event {
                Event::New => listener.on_new(view),
                Event::Load => listener.on_load(view),
                Event::SelectionModified => listener.on_selection_modified(view),
                Event::Activated => listener.on_activated(view),
                Event::PreSave => listener.on_pre_save(view)?,
                Event::PostSave => listener.on_post_save(view),
            }
        }
        Ok(())
    }
}

impl Default for Listeners {
    /// Every listener in this module.
    fn default() -> Self {
        let mut listeners = Self::empty();
        listeners.register(LineCount);
        listeners.register(MiniDiffOnSave);
        listeners.register(CreatePath);
        listeners.register(FindResults);
        listeners
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// Shows `L: row/rows, C: col/cols` for the first selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCount;

impl LineCount {
    fn update(view: &mut View) {
        let Some(first) = view.sel().first() else {
            view.set_status(LINE_COUNT_STATUS, "");
            return;
        };
        view.set_status(LINE_COUNT_STATUS, &line_count_status(view, first));
    }
}

/// The status text for a selection.
#[must_use]
pub fn line_count_status<V: TextView + ?Sized>(view: &V, sel: Region) -> String {
    let pt = sel.begin();
    let (row, col) = view.rowcol(pt);
    let cols = view.line(pt).size();
    let (rows, _) = view.rowcol(view.size());
    format!("L: {}/{}, C: {}/{}", row + 1, rows + 1, col + 1, cols + 1)
}

impl EventListener for LineCount {
    fn on_new(&self, view: &mut View) {
        Self::update(view);
    }

    fn on_load(&self, view: &mut View) {
        Self::update(view);
    }

    fn on_selection_modified(&self, view: &mut View) {
        Self::update(view);
    }
}

/// Resets the incremental diff after saving when `reset_mini_diff_on_save`
/// is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniDiffOnSave;

impl EventListener for MiniDiffOnSave {
    fn on_post_save(&self, view: &mut View) {
        if view.settings().reset_mini_diff_on_save {
            reset_mini_diff(view);
        }
    }
}

/// Creates the directory a file is about to be saved into.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatePath;

impl EventListener for CreatePath {
    fn on_pre_save(&self, view: &mut View) -> io::Result<()> {
        let Some(parent) = view.file_name().and_then(|p| p.parent()) else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() || parent.is_dir() {
            return Ok(());
        }
        tracing::debug!(dir = %parent.display(), "creating missing parent directory");
        fs::create_dir_all(parent)
    }
}

/// Keeps the find-in-files output view from being edited by accident.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindResults;

impl EventListener for FindResults {
    fn on_activated(&self, view: &mut View) {
        if view.name() == FIND_RESULTS_NAME {
            view.set_read_only(true);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
