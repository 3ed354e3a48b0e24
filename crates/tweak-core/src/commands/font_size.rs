//! Syntax-aware font size stepping.

use serde::Deserialize;

use crate::settings::Settings;
use crate::window::Window;

const MIN_FONT_SIZE: u32 = 8;
const MAX_FONT_SIZE: u32 = 128;

/// Arguments of `increase_syntax_font_size` / `decrease_syntax_font_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct FontSize {
    /// Always write the syntax-specific size, even when the syntax has none
    /// yet.
    pub syntax_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStep {
    Increase,
    Decrease,
}

impl FontStep {
    /// Larger sizes take larger steps.
    #[must_use]
    pub fn apply(self, size: u32) -> u32 {
        match self {
            Self::Increase => {
                let step = match size {
                    36.. => 4,
                    24.. => 2,
                    _ => 1,
                };
                (size + step).min(MAX_FONT_SIZE)
            }
            Self::Decrease => {
                let step = match size {
                    40.. => 4,
                    26.. => 2,
                    _ => 1,
                };
                size.saturating_sub(step).max(MIN_FONT_SIZE)
            }
        }
    }
}

/// Step the font size for `syntax`.
///
/// The syntax-specific size is changed when the syntax already defines one
/// or `syntax_only` is set; otherwise the global size is. Returns the new
/// size if it changed.
pub fn change_font_size(
    settings: &mut Settings,
    syntax: Option<&str>,
    syntax_only: bool,
    step: FontStep,
) -> Option<u32> {
    let syntax_size = syntax.and_then(|s| settings.syntax(s)).and_then(|s| s.font_size);

    match syntax {
        Some(name) if syntax_only || syntax_size.is_some() => {
            let current = syntax_size.unwrap_or(settings.font_size);
            let size = step.apply(current);
            if size == current {
                return None;
            }
            tracing::debug!(syntax = name, from = current, to = size, "syntax font size");
            settings.syntax_mut(name).font_size = Some(size);
            Some(size)
        }
        _ => {
            let current = settings.font_size;
            let size = step.apply(current);
            if size == current {
                return None;
            }
            tracing::debug!(from = current, to = size, "global font size");
            settings.font_size = size;
            Some(size)
        }
    }
}

impl FontSize {
    /// Step the font size for the active view's syntax.
    pub fn run(self, window: &mut Window, step: FontStep) -> Option<u32> {
        let syntax = window
            .active_view()
            .and_then(|v| v.syntax())
            .map(str::to_string);
        let changed = change_font_size(window.settings_mut(), syntax.as_deref(), self.syntax_only, step);
        if changed.is_some() {
            window.mark_settings_changed();
        }
        changed
    }
}
