//! Output panel switching and focus commands.

use serde::Deserialize;

use crate::host::TextView;
use crate::window::{OUTPUT_PREFIX, Window};

/// Arguments of `switch_panel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SwitchPanel {
    /// `None` leaves the choice to the panel list (see
    /// [`switch_panel_items`]).
    pub forward: Option<bool>,
}

impl SwitchPanel {
    /// Show the next (or previous) output panel that has content. When the
    /// visible panel is not one of them, the first one is shown.
    pub fn run(self, window: &mut Window) {
        let Some(forward) = self.forward else {
            return;
        };
        let panels = output_panels(window);
        if panels.is_empty() {
            tracing::debug!("no output panel with content");
            return;
        }

        let len = panels.len();
        let next = match window
            .active_panel()
            .and_then(|active| panels.iter().position(|p| p == active))
        {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None => 0,
        };
        window.show_panel(&panels[next]);
    }
}

/// Full names of the output panels with non-empty content, in window order.
#[must_use]
pub fn output_panels(window: &Window) -> Vec<String> {
    window
        .panels()
        .into_iter()
        .filter(|name| {
            name.strip_prefix(OUTPUT_PREFIX)
                .and_then(|short| window.find_output_panel(short))
                .is_some_and(|view| view.size() > 0)
        })
        .collect()
}

/// An entry of the panel picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelItem {
    /// Human-readable panel name.
    pub text: String,
    /// Name of the panel's view.
    pub annotation: String,
    /// Full panel name to pass to `show_panel`.
    pub value: String,
}

/// Items for the panel picker, plus the index of the visible panel.
#[must_use]
pub fn switch_panel_items(window: &Window) -> (Vec<PanelItem>, Option<usize>) {
    let active = window.active_panel();
    let mut selected = None;
    let items = output_panels(window)
        .into_iter()
        .enumerate()
        .map(|(idx, panel)| {
            if active == Some(panel.as_str()) {
                selected = Some(idx);
            }
            let short = panel.strip_prefix(OUTPUT_PREFIX).unwrap_or(&panel);
            PanelItem {
                text: panel_title(short),
                annotation: window
                    .find_output_panel(short)
                    .map(|v| v.name().to_string())
                    .unwrap_or_default(),
                value: panel.clone(),
            }
        })
        .collect();
    (items, selected)
}

/// `"exec"` is the build output; everything else is title-cased with
/// underscores as spaces.
fn panel_title(short: &str) -> String {
    if short == "exec" {
        return "Build Output".to_string();
    }
    short
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Focus the visible output panel.
pub fn focus_active_panel(window: &mut Window) {
    let Some(active) = window.active_panel() else {
        return;
    };
    let short = active.strip_prefix(OUTPUT_PREFIX).unwrap_or(active).to_string();
    window.focus_panel(&short);
}

/// Give focus back to the active view.
pub fn focus_active_sheet(window: &mut Window) {
    if let Some(index) = window.active_index() {
        window.focus_view(index);
    }
}
