//! Syntax selection and extension associations.
//!
//! Syntaxes are known by name through the `[syntax.<Name>]` tables of the
//! settings. A syntax's `extensions` decide which syntax a file opens with
//! (see [`Window::open_file`]).

use std::path::Path;

use serde::Deserialize;

use super::panels::PanelItem;
use crate::host::TextView;
use crate::settings::Settings;
use crate::view::View;
use crate::window::Window;

/// Arguments of `select_syntax`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectSyntax {
    pub syntax: String,
}

impl SelectSyntax {
    pub fn run(&self, view: &mut View) {
        view.assign_syntax(self.syntax.as_str());
    }
}

/// Arguments of `new_file_with_syntax`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewFileWithSyntax {
    pub syntax: String,
}

impl NewFileWithSyntax {
    /// Open an empty view set to the syntax. Returns its index.
    pub fn run(&self, window: &mut Window) -> usize {
        let index = window.new_file();
        if let Some(view) = window.view_mut(index) {
            view.assign_syntax(self.syntax.as_str());
        }
        index
    }
}

/// Arguments of `always_open_file_with_syntax`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlwaysOpenFileWithSyntax {
    pub syntax: String,
}

impl AlwaysOpenFileWithSyntax {
    /// Only offered for views backed by a file.
    #[must_use]
    pub fn is_enabled(window: &Window) -> bool {
        window.active_view().and_then(TextView::file_name).is_some()
    }

    /// Associate the active file's extension with the syntax and assign
    /// the syntax to the view.
    ///
    /// The extension moves out of the view's previous syntax. Returns
    /// `false` without changing anything when the view has no file, the
    /// file has no extension or the syntax name is empty.
    pub fn run(&self, window: &mut Window) -> bool {
        let Some(view) = window.active_view() else {
            return false;
        };
        let Some(extension) = view
            .file_name()
            .and_then(Path::extension)
            .map(|e| e.to_string_lossy().into_owned())
        else {
            return false;
        };
        if self.syntax.is_empty() {
            return false;
        }
        let previous = view.syntax().map(str::to_string);

        let settings = window.settings_mut();
        if let Some(previous) = previous.as_deref().filter(|p| *p != self.syntax) {
            if let Some(old) = settings.syntax.get_mut(previous) {
                old.extensions.retain(|e| *e != extension);
            }
        }
        let extensions = &mut settings.syntax_mut(&self.syntax).extensions;
        extensions.push(extension.clone());
        extensions.sort();
        extensions.dedup();
        tracing::debug!(syntax = %self.syntax, %extension, "always open with syntax");

        window.mark_settings_changed();
        if let Some(view) = window.active_view_mut() {
            view.assign_syntax(self.syntax.as_str());
        }
        true
    }
}

/// Picker entries for the known syntaxes, sorted by name, plus the index of
/// `current`.
#[must_use]
pub fn syntax_items(settings: &Settings, current: Option<&str>) -> (Vec<PanelItem>, Option<usize>) {
    let items: Vec<PanelItem> = settings
        .syntax
        .iter()
        .map(|(name, syntax)| PanelItem {
            text: name.clone(),
            annotation: syntax.extensions.join(", "),
            value: name.clone(),
        })
        .collect();
    let selected = current.and_then(|c| items.iter().position(|i| i.value == c));
    (items, selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window_with_file(name: &str, settings: Settings) -> (tempfile::TempDir, Window) {
        let dir = tempfile::tempdir().unwrap();
        let mut window = Window::new(settings);
        window.open_file(&dir.path().join(name).display().to_string(), false).unwrap();
        (dir, window)
    }

    // ── select_syntax / new_file_with_syntax ─────────────────────────────

    #[test]
    fn select_assigns_syntax() {
        let mut view = View::from_text("# Title");
        SelectSyntax { syntax: "Markdown".into() }.run(&mut view);
        assert_eq!(view.syntax(), Some("Markdown"));
    }

    #[test]
    fn new_file_gets_syntax() {
        let mut window = Window::default();
        let index = NewFileWithSyntax { syntax: "JSON".into() }.run(&mut window);
        assert_eq!(window.active_index(), Some(index));
        assert_eq!(window.view(index).unwrap().syntax(), Some("JSON"));
    }

    // ── always_open_file_with_syntax ─────────────────────────────────────

    #[test]
    fn extension_moves_between_syntaxes() {
        let mut settings = Settings::default();
        settings.syntax_mut("Plain Text").extensions = vec!["txt".into(), "conf".into()];
        settings.syntax_mut("INI").extensions = vec!["ini".into()];
        let (_dir, mut window) = window_with_file("app.conf", settings);
        assert_eq!(window.active_view().unwrap().syntax(), Some("Plain Text"));

        assert!(AlwaysOpenFileWithSyntax { syntax: "INI".into() }.run(&mut window));

        let settings = window.settings();
        assert_eq!(settings.syntax("Plain Text").unwrap().extensions, ["txt"]);
        assert_eq!(settings.syntax("INI").unwrap().extensions, ["conf", "ini"]);
        assert_eq!(window.active_view().unwrap().syntax(), Some("INI"));
        assert!(window.settings_changed());
    }

    #[test]
    fn extension_is_added_once() {
        let mut settings = Settings::default();
        settings.syntax_mut("Rust").extensions = vec!["rs".into()];
        let (_dir, mut window) = window_with_file("main.rs", settings);

        assert!(AlwaysOpenFileWithSyntax { syntax: "Rust".into() }.run(&mut window));
        assert_eq!(window.settings().syntax("Rust").unwrap().extensions, ["rs"]);
    }

    #[test]
    fn needs_file_with_extension() {
        let mut window = Window::default();
        window.new_file();
        assert!(!AlwaysOpenFileWithSyntax::is_enabled(&window));
        assert!(!AlwaysOpenFileWithSyntax { syntax: "Rust".into() }.run(&mut window));

        let (_dir, mut window) = window_with_file("Makefile", Settings::default());
        assert!(AlwaysOpenFileWithSyntax::is_enabled(&window));
        assert!(!AlwaysOpenFileWithSyntax { syntax: "Makefile".into() }.run(&mut window));
        assert!(!window.settings_changed());
    }

    // ── syntax_items ─────────────────────────────────────────────────────

    #[test]
    fn items_are_sorted_with_current_selected() {
        let mut settings = Settings::default();
        settings.syntax_mut("Rust").extensions = vec!["rs".into()];
        settings.syntax_mut("C").extensions = vec!["c".into(), "h".into()];

        let (items, selected) = syntax_items(&settings, Some("Rust"));
        let names: Vec<_> = items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(names, ["C", "Rust"]);
        assert_eq!(items[0].annotation, "c, h");
        assert_eq!(selected, Some(1));
        assert_eq!(syntax_items(&settings, None).1, None);
    }
}
