//! Project folder commands.

use std::path::PathBuf;

use serde::Deserialize;

use super::panels::PanelItem;
use crate::window::Window;

/// One folder path or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Dirs {
    One(String),
    Many(Vec<String>),
}

impl Default for Dirs {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Dirs {
    fn paths(&self) -> Vec<PathBuf> {
        match self {
            Self::One(dir) => vec![PathBuf::from(dir)],
            Self::Many(dirs) => dirs.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Arguments of `prompt_remove_folder`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RemoveFolder {
    pub dirs: Dirs,
}

impl RemoveFolder {
    /// Only offered while the project has folders.
    #[must_use]
    pub fn is_enabled(window: &Window) -> bool {
        !window.folders().is_empty()
    }

    /// Remove the listed folders from the project. Returns how many were
    /// removed.
    pub fn run(&self, window: &mut Window) -> usize {
        let paths = self.dirs.paths();
        if paths.is_empty() {
            return 0;
        }
        let removed = window.remove_folders(&paths);
        tracing::debug!(removed, "removed project folders");
        removed
    }
}

/// Picker entries for the folders of the project.
#[must_use]
pub fn remove_folder_items(window: &Window) -> Vec<PanelItem> {
    window
        .folders()
        .iter()
        .map(|folder| {
            let path = folder.path.display().to_string();
            PanelItem {
                text: folder.display_name(),
                annotation: path.clone(),
                value: path,
            }
        })
        .collect()
}
