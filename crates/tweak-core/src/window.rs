//! Window — views, output panels, project folders and the console.
//!
//! The window is the target of window commands and the owner of every view
//! text commands run on. Views are addressed by index into
//! [`views`](Window::views); closing a view shifts the ones after it.
//!
//! # Panels
//!
//! Panel names follow the host convention: output panels are called
//! `output.<name>` and are looked up by `<name>`. The console is always
//! listed as a panel (`"console"`), but it is not an output panel.
//!
//! # Focus
//!
//! Focus is either on the active view ("sheet") or on a panel. Text
//! commands run on whichever view has focus.
//!
//! # Events
//!
//! Opening, creating, focusing and saving views emit the corresponding
//! [`Event`] to the window's [`Listeners`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::commands::find_results::{GotoTarget, TargetCache};
use crate::console::Console;
use crate::error::{Error, Result};
use crate::events::{Event, Listeners};
use crate::host::{Element, TextView};
use crate::location::LocationContext;
use crate::region::Region;
use crate::settings::Settings;
use crate::view::View;

/// Prefix of output panel names.
pub const OUTPUT_PREFIX: &str = "output.";

/// The console's panel name.
pub const CONSOLE_PANEL: &str = "console";

// ---------------------------------------------------------------------------
// Project folders
// ---------------------------------------------------------------------------

/// A folder in the project sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectFolder {
    pub path: PathBuf,

    /// Display name; the folder's base name when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl ProjectFolder {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .path
                .file_name()
                .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Where keyboard focus is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Focus {
    /// The active view.
    #[default]
    Sheet,
    /// An output panel, by short name (without `output.`).
    Panel(String),
}

#[derive(Debug)]
struct OutputPanel {
    name: String,
    view: View,
}

#[derive(Debug, Default)]
pub struct Window {
    views: Vec<View>,
    active: Option<usize>,
    panels: Vec<OutputPanel>,
    active_panel: Option<String>,
    focus: Focus,
    folders: Vec<ProjectFolder>,
    console: Console,
    settings: Settings,
    settings_changed: bool,
    status_message: Option<String>,
    auto_complete_requested: bool,
    listeners: Listeners,
    goto_targets: HashMap<(u64, GotoTarget), TargetCache>,
}

impl Window {
    /// An empty window using `settings` for every view it creates.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_listeners(mut self, listeners: Listeners) -> Self {
        self.listeners = listeners;
        self
    }

    // ── Settings ─────────────────────────────────────────────────────────

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Record that the settings changed and should be written back.
    pub const fn mark_settings_changed(&mut self) {
        self.settings_changed = true;
    }

    /// True once a command changed settings that belong in the settings
    /// file.
    #[must_use]
    pub const fn settings_changed(&self) -> bool {
        self.settings_changed
    }

    // ── Views ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    #[must_use]
    pub fn view(&self, index: usize) -> Option<&View> {
        self.views.get(index)
    }

    pub fn view_mut(&mut self, index: usize) -> Option<&mut View> {
        self.views.get_mut(index)
    }

    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn active_view(&self) -> Option<&View> {
        self.active.and_then(|i| self.views.get(i))
    }

    pub fn active_view_mut(&mut self) -> Option<&mut View> {
        self.active.and_then(|i| self.views.get_mut(i))
    }

    /// Index of the view backed by `path`.
    #[must_use]
    pub fn find_view(&self, path: &Path) -> Option<usize> {
        self.views.iter().position(|v| v.file_name() == Some(path))
    }

    /// Add an existing view and focus it.
    pub fn add_view(&mut self, view: View) -> usize {
        self.views.push(view);
        let index = self.views.len() - 1;
        self.focus_view(index);
        index
    }

    /// Create an empty view, focus it and return its index.
    pub fn new_file(&mut self) -> usize {
        let mut view = View::new().with_settings(self.settings.clone());
        self.emit(Event::New, &mut view);
        self.add_view(view)
    }

    /// Open a file and focus it.
    ///
    /// With `encoded` set, `spec` may end in `:line` or `:line:col`
    /// (1-based) and the caret is placed there. A file that is already open
    /// is focused instead of loaded again. A path that does not exist opens
    /// as an empty view that will be created on save.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open_file(&mut self, spec: &str, encoded: bool) -> Result<usize> {
        let (path, position) = if encoded {
            split_encoded_position(spec)
        } else {
            (PathBuf::from(spec), None)
        };

        let index = match self.find_view(&path) {
            Some(index) => {
                self.focus_view(index);
                index
            }
            None if path.is_file() => {
                let mut view = View::from_file(&path)?.with_settings(self.settings.clone());
                self.detect_syntax(&mut view, &path);
                tracing::debug!(path = %path.display(), "opened file");
                self.emit(Event::Load, &mut view);
                self.add_view(view)
            }
            None => {
                let mut view = View::new().with_settings(self.settings.clone());
                view.set_file_path(path.clone());
                self.detect_syntax(&mut view, &path);
                tracing::debug!(path = %path.display(), "opened new file");
                self.emit(Event::New, &mut view);
                self.add_view(view)
            }
        };

        if let Some((line, col)) = position {
            let view = &mut self.views[index];
            let pt = view.text_point(line.saturating_sub(1), col.saturating_sub(1));
            view.sel_mut().set(vec![Region::point(pt)]);
            view.show(Region::point(pt));
            self.emit_at(Event::SelectionModified, index);
        }
        Ok(index)
    }

    /// Assign the syntax whose extensions include the file's extension.
    fn detect_syntax(&self, view: &mut View, path: &Path) {
        let syntax = path
            .extension()
            .and_then(|ext| self.settings.syntax_for_extension(&ext.to_string_lossy()))
            .map(str::to_string);
        if let Some(syntax) = syntax {
            tracing::trace!(%syntax, path = %path.display(), "syntax from extension");
            view.assign_syntax(syntax);
        }
    }

    /// Make `index` the active view and give it focus.
    pub fn focus_view(&mut self, index: usize) {
        if index >= self.views.len() {
            return;
        }
        self.active = Some(index);
        self.focus = Focus::Sheet;
        self.emit_at(Event::Activated, index);
    }

    /// Remove a view from the window.
    ///
    /// # Errors
    ///
    /// Refuses to close a view with unsaved changes unless it is scratch.
    pub fn close_view(&mut self, index: usize) -> Result<View> {
        let Some(view) = self.views.get(index) else {
            return Err(Error::NoActiveView);
        };
        if view.is_dirty() && !view.is_scratch() {
            return Err(Error::Unsaved(view.name().to_string()));
        }

        let view = self.views.remove(index);
        self.goto_targets.retain(|(id, _), _| *id != view.id());
        self.active = match self.active {
            _ if self.views.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.views.len() - 1)),
            None => None,
        };
        tracing::debug!(view = %view.name(), "closed view");
        Ok(view)
    }

    /// Save a view to its file, running the save listeners around it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFilePath`] for views without a file, or the I/O
    /// error of the pre-save hooks or the write.
    pub fn save_view(&mut self, index: usize) -> Result<()> {
        let view = self.views.get_mut(index).ok_or(Error::NoActiveView)?;
        if view.file_name().is_none() {
            return Err(Error::NoFilePath);
        }
        self.listeners.emit(Event::PreSave, view)?;
        view.save()?;
        tracing::debug!(view = %view.name(), "saved");
        self.emit_at(Event::PostSave, index);
        Ok(())
    }

    // ── Groups ───────────────────────────────────────────────────────────

    /// The group of the active view; group 0 when no view is open.
    #[must_use]
    pub fn active_group(&self) -> usize {
        self.active_view().map_or(0, View::group)
    }

    /// Indices of the views in `group`, in window order.
    #[must_use]
    pub fn views_in_group(&self, group: usize) -> Vec<usize> {
        self.views
            .iter()
            .enumerate()
            .filter(|(_, v)| v.group() == group)
            .map(|(i, _)| i)
            .collect()
    }

    /// Move view `index` into `group`.
    pub fn move_to_group(&mut self, index: usize, group: usize) {
        if let Some(view) = self.views.get_mut(index) {
            view.set_group(group);
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    /// Create (or clear) the output panel `name` and return its view.
    pub fn create_output_panel(&mut self, name: &str) -> &mut View {
        let fresh = View::new()
            .with_name(name)
            .with_element(Element::OutputPanel)
            .with_settings(self.settings.clone());

        let index = if let Some(i) = self.panels.iter().position(|p| p.name == name) {
            self.panels[i].view = fresh;
            i
        } else {
            self.panels.push(OutputPanel {
                name: name.to_string(),
                view: fresh,
            });
            self.panels.len() - 1
        };
        &mut self.panels[index].view
    }

    /// The output panel `name` (without the `output.` prefix).
    #[must_use]
    pub fn find_output_panel(&self, name: &str) -> Option<&View> {
        self.panels.iter().find(|p| p.name == name).map(|p| &p.view)
    }

    pub fn find_output_panel_mut(&mut self, name: &str) -> Option<&mut View> {
        self.panels
            .iter_mut()
            .find(|p| p.name == name)
            .map(|p| &mut p.view)
    }

    /// Every panel name, console first, then output panels in creation order.
    #[must_use]
    pub fn panels(&self) -> Vec<String> {
        std::iter::once(CONSOLE_PANEL.to_string())
            .chain(self.panels.iter().map(|p| format!("{OUTPUT_PREFIX}{}", p.name)))
            .collect()
    }

    /// The visible panel's full name, if a panel is shown.
    #[must_use]
    pub fn active_panel(&self) -> Option<&str> {
        self.active_panel.as_deref()
    }

    /// Show the panel named `panel`. Unknown names are ignored.
    pub fn show_panel(&mut self, panel: &str) {
        if self.panels().iter().any(|p| p == panel) {
            tracing::debug!(panel, "show panel");
            self.active_panel = Some(panel.to_string());
        }
    }

    pub fn hide_panel(&mut self) {
        self.active_panel = None;
        if matches!(self.focus, Focus::Panel(_)) {
            self.focus = Focus::Sheet;
        }
    }

    // ── Focus ────────────────────────────────────────────────────────────

    #[must_use]
    pub const fn focus(&self) -> &Focus {
        &self.focus
    }

    /// Give focus to the output panel `name`, if it exists.
    pub fn focus_panel(&mut self, name: &str) {
        if self.find_output_panel(name).is_some() {
            self.focus = Focus::Panel(name.to_string());
        }
    }

    /// Give focus back to the active view.
    pub fn focus_sheet(&mut self) {
        self.focus = Focus::Sheet;
    }

    /// The view that has keyboard focus.
    pub fn focused_view_mut(&mut self) -> Option<&mut View> {
        match &self.focus {
            Focus::Panel(name) => {
                let name = name.clone();
                self.find_output_panel_mut(&name)
            }
            Focus::Sheet => self.active_view_mut(),
        }
    }

    /// Emit `event` for the view that has focus.
    pub(crate) fn emit_focused(&mut self, event: Event) {
        let name = match &self.focus {
            Focus::Panel(name) => Some(name.clone()),
            Focus::Sheet => None,
        };
        match name {
            Some(name) => {
                if let Some(panel) = self.panels.iter_mut().find(|p| p.name == name) {
                    if let Err(e) = self.listeners.emit(event, &mut panel.view) {
                        tracing::warn!(error = %e, ?event, "listener failed");
                    }
                }
            }
            None => {
                if let Some(index) = self.active {
                    self.emit_at(event, index);
                }
            }
        }
    }

    // ── Project ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn folders(&self) -> &[ProjectFolder] {
        &self.folders
    }

    pub fn add_folder(&mut self, folder: ProjectFolder) {
        self.folders.push(folder);
    }

    /// Remove every folder whose path is in `paths`. Returns how many were
    /// removed.
    pub fn remove_folders(&mut self, paths: &[PathBuf]) -> usize {
        let before = self.folders.len();
        self.folders.retain(|f| !paths.contains(&f.path));
        before - self.folders.len()
    }

    /// What location completions need to know about this window.
    #[must_use]
    pub fn location_context(&self) -> LocationContext<'_> {
        LocationContext {
            folders: self.folders.iter().map(|f| f.path.as_path()).collect(),
            open_files: self.views.iter().filter_map(TextView::file_name).collect(),
            active_file: self.active_view().and_then(TextView::file_name),
        }
    }

    // ── Console and status ───────────────────────────────────────────────

    #[must_use]
    pub const fn console(&self) -> &Console {
        &self.console
    }

    pub const fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Print to the console, keeping `console_max_history_lines` lines.
    pub fn print(&mut self, text: &str) {
        let limit = self.settings.console_max_history_lines;
        self.console.print_with_limit(text, limit);
    }

    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "status");
        self.status_message = Some(message);
    }

    /// Ask the host to show the auto-complete popup again.
    pub const fn request_auto_complete(&mut self) {
        self.auto_complete_requested = true;
    }

    #[must_use]
    pub const fn auto_complete_requested(&self) -> bool {
        self.auto_complete_requested
    }

    // ── Find results ─────────────────────────────────────────────────────

    /// Take the cached find-results targets of view `id` for the duration
    /// of a command. Hand them back with [`store_goto_targets`](Self::store_goto_targets).
    pub(crate) fn take_goto_targets(&mut self, id: u64, target: GotoTarget) -> TargetCache {
        self.goto_targets.remove(&(id, target)).unwrap_or_default()
    }

    pub(crate) fn store_goto_targets(&mut self, id: u64, target: GotoTarget, cache: TargetCache) {
        self.goto_targets.insert((id, target), cache);
    }

    // ── Events ───────────────────────────────────────────────────────────

    fn emit(&self, event: Event, view: &mut View) {
        if let Err(e) = self.listeners.emit(event, view) {
            tracing::warn!(error = %e, ?event, "listener failed");
        }
    }

    fn emit_at(&mut self, event: Event, index: usize) {
        if let Some(view) = self.views.get_mut(index) {
            if let Err(e) = self.listeners.emit(event, view) {
                tracing::warn!(error = %e, ?event, "listener failed");
            }
        }
    }
}

/// Split a trailing `:line` or `:line:col` off `spec`.
fn split_encoded_position(spec: &str) -> (PathBuf, Option<(usize, usize)>) {
    let mut rest = spec;
    let mut numbers = Vec::with_capacity(2);
    while numbers.len() < 2 {
        let Some((head, tail)) = rest.rsplit_once(':') else {
            break;
        };
        let Ok(n) = tail.parse::<usize>() else {
            break;
        };
        numbers.push(n);
        rest = head;
    }

    let position = match numbers.as_slice() {
        [line] => Some((*line, 1)),
        [col, line] => Some((*line, *col)),
        _ => None,
    };
    (PathBuf::from(rest), position)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LINE_COUNT_STATUS;
    use pretty_assertions::assert_eq;
    use std::fs;

    // ── split_encoded_position ───────────────────────────────────────────

    #[test]
    fn encoded_positions() {
        assert_eq!(split_encoded_position("a.rs"), (PathBuf::from("a.rs"), None));
        assert_eq!(
            split_encoded_position("a.rs:12"),
            (PathBuf::from("a.rs"), Some((12, 1)))
        );
        assert_eq!(
            split_encoded_position("/x/a.rs:12:5"),
            (PathBuf::from("/x/a.rs"), Some((12, 5)))
        );
        assert_eq!(
            split_encoded_position("C:\\x\\a.rs:3"),
            (PathBuf::from("C:\\x\\a.rs"), Some((3, 1)))
        );
    }

    // ── Views ────────────────────────────────────────────────────────────

    #[test]
    fn open_file_places_caret_and_reuses_views() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();
        let spec = format!("{}:2:3", path.display());

        let mut window = Window::default();
        let index = window.open_file(&spec, true).unwrap();
        let view = window.view(index).unwrap();
        assert_eq!(view.sel().as_slice(), &[Region::point(6)]);
        assert_eq!(view.status(LINE_COUNT_STATUS), Some("L: 2/4, C: 3/4"));

        window.new_file();
        assert_eq!(window.open_file(&path.display().to_string(), false).unwrap(), index);
        assert_eq!(window.views().len(), 2);
        assert_eq!(window.active_index(), Some(index));
    }

    #[test]
    fn open_missing_file_creates_empty_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let mut window = Window::default();
        let index = window.open_file(&path.display().to_string(), false).unwrap();

        let view = window.view(index).unwrap();
        assert_eq!(view.size(), 0);
        assert_eq!(view.name(), "new.txt");
        assert_eq!(view.file_name(), Some(path.as_path()));
    }

    #[test]
    fn close_refuses_dirty_views_unless_scratch() {
        let mut window = Window::default();
        let index = window.new_file();
        window.view_mut(index).unwrap().insert(0, "x");

        assert!(matches!(window.close_view(index), Err(Error::Unsaved(_))));

        window.view_mut(index).unwrap().set_scratch(true);
        assert!(window.close_view(index).is_ok());
        assert_eq!(window.active_index(), None);
    }

    #[test]
    fn closing_keeps_active_index_valid() {
        let mut window = Window::default();
        window.new_file();
        window.new_file();
        let last = window.new_file();
        assert_eq!(window.active_index(), Some(last));

        window.close_view(0).unwrap();
        assert_eq!(window.active_index(), Some(1));
        window.close_view(1).unwrap();
        assert_eq!(window.active_index(), Some(0));
    }

    #[test]
    fn save_view_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("er").join("f.txt");

        let mut window = Window::default();
        let index = window.open_file(&path.display().to_string(), false).unwrap();
        window.view_mut(index).unwrap().insert(0, "hello");
        window.save_view(index).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        assert!(!window.view(index).unwrap().is_dirty());
    }

    #[test]
    fn open_file_detects_syntax_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.syntax_mut("Rust").extensions = vec!["rs".into()];
        let mut window = Window::new(settings);

        let rust = window.open_file(&dir.path().join("lib.rs").display().to_string(), false).unwrap();
        let text = window.open_file(&dir.path().join("notes.txt").display().to_string(), false).unwrap();

        assert_eq!(window.view(rust).unwrap().syntax(), Some("Rust"));
        assert_eq!(window.view(text).unwrap().syntax(), None);
    }

    #[test]
    fn save_view_without_file_fails() {
        let mut window = Window::default();
        let index = window.new_file();
        assert!(matches!(window.save_view(index), Err(Error::NoFilePath)));
    }

    // ── Groups ───────────────────────────────────────────────────────────

    #[test]
    fn groups_follow_the_active_view() {
        let mut window = Window::default();
        assert_eq!(window.active_group(), 0);

        let a = window.new_file();
        let b = window.new_file();
        let c = window.new_file();
        window.move_to_group(b, 1);
        window.move_to_group(c, 1);

        assert_eq!(window.views_in_group(0), [a]);
        assert_eq!(window.views_in_group(1), [b, c]);
        assert_eq!(window.active_group(), 1);
        window.focus_view(a);
        assert_eq!(window.active_group(), 0);
    }

    // ── Panels ───────────────────────────────────────────────────────────

    #[test]
    fn panels_list_console_then_output_panels() {
        let mut window = Window::default();
        window.create_output_panel("exec");
        window.create_output_panel("find_results");
        assert_eq!(window.panels(), ["console", "output.exec", "output.find_results"]);

        window.show_panel("output.exec");
        assert_eq!(window.active_panel(), Some("output.exec"));
        window.show_panel("output.nope");
        assert_eq!(window.active_panel(), Some("output.exec"));
    }

    #[test]
    fn focus_follows_panel_and_sheet() {
        let mut window = Window::default();
        let index = window.new_file();
        window.create_output_panel("exec").insert(0, "build log");

        window.focus_panel("exec");
        assert_eq!(window.focused_view_mut().unwrap().name(), "exec");

        window.focus_sheet();
        let id = window.view(index).unwrap().id();
        assert_eq!(window.focused_view_mut().unwrap().id(), id);
    }

    #[test]
    fn hiding_panel_returns_focus_to_sheet() {
        let mut window = Window::default();
        window.create_output_panel("exec");
        window.show_panel("output.exec");
        window.focus_panel("exec");

        window.hide_panel();

        assert_eq!(window.active_panel(), None);
        assert_eq!(window.focus(), &Focus::Sheet);
    }

    #[test]
    fn window_without_listeners_sets_no_status() {
        let mut window = Window::default().with_listeners(Listeners::empty());
        let index = window.new_file();
        assert_eq!(window.view(index).unwrap().status(LINE_COUNT_STATUS), None);
    }

    // ── Project ──────────────────────────────────────────────────────────

    #[test]
    fn folder_display_names() {
        assert_eq!(ProjectFolder::new("/work/tweak").display_name(), "tweak");
        let named = ProjectFolder {
            path: "/work/tweak".into(),
            name: Some("Tweak".into()),
        };
        assert_eq!(named.display_name(), "Tweak");
    }

    #[test]
    fn print_respects_history_limit() {
        let mut settings = Settings::default();
        settings.console_max_history_lines = 2;
        let mut window = Window::new(settings);
        window.print("a\nb\nc");
        assert_eq!(window.console().len(), 2);
    }
}
