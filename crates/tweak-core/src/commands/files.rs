//! Creating, opening, saving and closing files.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;

use crate::error::Result;
use crate::host::TextView;
use crate::view::View;
use crate::window::Window;

static URL_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(vscode|subl):(//)?((file|open)/)?").expect("url scheme pattern is valid")
});

/// Open a new view that closes without asking to save.
pub fn new_scratch_file(window: &mut Window) -> usize {
    let index = window.new_file();
    if let Some(view) = window.view_mut(index) {
        view.set_scratch(true);
    }
    index
}

// ---------------------------------------------------------------------------
// open_file_from_url
// ---------------------------------------------------------------------------

/// Arguments of `open_file_from_url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenFileFromUrl {
    pub url: String,
}

impl OpenFileFromUrl {
    /// Open the file a `subl://open/path:line:col` (or `vscode://file/...`)
    /// URL points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn run(&self, window: &mut Window) -> Result<usize> {
        let stripped = URL_SCHEME.replace(&self.url, "");
        let spec = percent_decode_str(&stripped).decode_utf8_lossy();
        tracing::debug!(url = %self.url, %spec, "open file from url");
        window.open_file(&spec, true)
    }
}

// ---------------------------------------------------------------------------
// Saving and closing
// ---------------------------------------------------------------------------

/// Save every view backed by a file. New and scratch views without a file
/// are left alone.
///
/// # Errors
///
/// Every view is attempted; the first failure is returned.
pub fn save_all_existing(window: &mut Window) -> Result<()> {
    let targets: Vec<usize> = window
        .views()
        .iter()
        .enumerate()
        .filter(|(_, v)| v.file_name().is_some())
        .map(|(i, _)| i)
        .collect();

    let mut first_error = None;
    for index in targets {
        if let Err(e) = window.save_view(index) {
            tracing::warn!(error = %e, index, "save failed");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Arguments of `close_immediately`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CloseImmediately {
    pub save: bool,
}

impl Default for CloseImmediately {
    fn default() -> Self {
        Self { save: true }
    }
}

impl CloseImmediately {
    /// Close the active view without prompting. Dirty views with an
    /// existing file are saved first when `save` is set; anything else is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns the save error; the view then stays open.
    pub fn run(self, window: &mut Window) -> Result<()> {
        let Some(index) = window.active_index() else {
            return Ok(());
        };
        let Some(view) = window.view_mut(index) else {
            return Ok(());
        };

        let on_disk = view.file_name().is_some_and(std::path::Path::exists);
        if !self.save || !on_disk {
            view.set_scratch(true);
        } else if view.is_dirty() {
            window.save_view(index)?;
        }
        window.close_view(index)?;
        Ok(())
    }
}

/// Arguments of `close_all_in_group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CloseAllInGroup {
    pub save: bool,
}

impl Default for CloseAllInGroup {
    fn default() -> Self {
        Self { save: true }
    }
}

impl CloseAllInGroup {
    /// Close every view in the active group the way `close_immediately`
    /// does. Views in other groups stay open.
    ///
    /// # Errors
    ///
    /// Stops at the first view that fails to save; it and the views after
    /// it stay open.
    pub fn run(self, window: &mut Window) -> Result<()> {
        let group = window.active_group();
        let ids: Vec<u64> = window
            .views_in_group(group)
            .into_iter()
            .filter_map(|i| window.view(i).map(View::id))
            .collect();

        for id in ids {
            let Some(index) = window.views().iter().position(|v| v.id() == id) else {
                continue;
            };
            window.focus_view(index);
            CloseImmediately { save: self.save }.run(window)?;
        }
        Ok(())
    }
}
