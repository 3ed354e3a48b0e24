//! Settings — the preferences file and `key=value` overrides.
//!
//! Settings are loaded from a TOML file (by default
//! `<config_dir>/tweak/settings.toml`) and can be overridden with
//! `:set`-style directives. Commands receive them explicitly instead of
//! flipping a global and restoring it afterwards.
//!
//! ```toml
//! font_size = 11
//! translate_tabs_to_spaces = true
//!
//! [syntax.Rust]
//! font_size = 13
//! extensions = ["rs"]
//! ```
//!
//! # Override syntax
//!
//! | Syntax        | Effect                        |
//! |---------------|-------------------------------|
//! | `key`         | Enable boolean                |
//! | `nokey`       | Disable boolean               |
//! | `key!`        | Toggle boolean                |
//! | `key=value`   | Assign value                  |
//!
//! | Key                          | Abbrev | Type    | Default |
//! |------------------------------|--------|---------|---------|
//! | `font_size`                  | `fs`   | integer | 10      |
//! | `tab_size`                   | `ts`   | integer | 4       |
//! | `translate_tabs_to_spaces`   | `et`   | bool    | false   |
//! | `console_max_history_lines`  |        | integer | 16384   |
//! | `auto_complete_disabled`     |        | bool    | false   |
//! | `reset_mini_diff_on_save`    |        | bool    | false   |

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Font size used when neither the preferences nor the syntax define one.
pub const DEFAULT_FONT_SIZE: u32 = 10;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub font_size: u32,
    pub tab_size: usize,
    pub translate_tabs_to_spaces: bool,
    pub console_max_history_lines: usize,
    pub auto_complete_disabled: bool,
    pub reset_mini_diff_on_save: bool,

    /// Per-syntax settings, keyed by syntax name (`"Rust"`, `"Markdown"`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub syntax: BTreeMap<String, SyntaxSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            tab_size: 4,
            translate_tabs_to_spaces: false,
            console_max_history_lines: 16384,
            auto_complete_disabled: false,
            reset_mini_diff_on_save: false,
            syntax: BTreeMap::new(),
        }
    }
}

/// Settings that apply to one syntax only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl Settings {
    /// `<config_dir>/tweak/settings.toml`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tweak").join("settings.toml"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Settings for `syntax`, if any were defined.
    #[must_use]
    pub fn syntax(&self, syntax: &str) -> Option<&SyntaxSettings> {
        self.syntax.get(syntax)
    }

    /// Settings for `syntax`, created empty on first use.
    pub fn syntax_mut(&mut self, syntax: &str) -> &mut SyntaxSettings {
        self.syntax.entry(syntax.to_string()).or_default()
    }

    /// The syntax whose `extensions` list `extension` (without the dot).
    /// The first match in name order wins.
    #[must_use]
    pub fn syntax_for_extension(&self, extension: &str) -> Option<&str> {
        self.syntax
            .iter()
            .find(|(_, s)| s.extensions.iter().any(|e| e == extension))
            .map(|(name, _)| name.as_str())
    }

    /// Apply every directive in a whitespace-separated override string.
    ///
    /// # Errors
    ///
    /// Returns an error on the first unknown key or unparsable value.
    pub fn apply_overrides(&mut self, args: &str) -> Result<()> {
        for directive in parse_set(args) {
            self.apply(&directive)?;
        }
        Ok(())
    }

    /// Apply a single directive.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, booleans assigned something other
    /// than `true`/`false`, and non-numeric values for numeric keys.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<()> {
        match directive {
            SetDirective::On(name) => *self.bool_mut(name)? = true,
            SetDirective::Off(name) => *self.bool_mut(name)? = false,
            SetDirective::Toggle(name) => {
                let flag = self.bool_mut(name)?;
                *flag = !*flag;
            }
            SetDirective::Assign(name, value) => {
                let invalid = || Error::InvalidSettingValue {
                    name: name.clone(),
                    value: value.clone(),
                };
                match canonical_name(name) {
                    Some("font_size") => self.font_size = value.parse().map_err(|_| invalid())?,
                    Some("tab_size") => self.tab_size = value.parse().map_err(|_| invalid())?,
                    Some("console_max_history_lines") => {
                        self.console_max_history_lines = value.parse().map_err(|_| invalid())?;
                    }
                    Some(_) => *self.bool_mut(name)? = value.parse().map_err(|_| invalid())?,
                    None => return Err(Error::UnknownSetting(name.clone())),
                }
            }
        }
        Ok(())
    }

    fn bool_mut(&mut self, name: &str) -> Result<&mut bool> {
        match canonical_name(name) {
            Some("translate_tabs_to_spaces") => Ok(&mut self.translate_tabs_to_spaces),
            Some("auto_complete_disabled") => Ok(&mut self.auto_complete_disabled),
            Some("reset_mini_diff_on_save") => Ok(&mut self.reset_mini_diff_on_save),
            Some(_) => Err(Error::InvalidSettingValue {
                name: name.to_string(),
                value: "<boolean>".to_string(),
            }),
            None => Err(Error::UnknownSetting(name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Override parsing
// ---------------------------------------------------------------------------

/// A parsed override directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `key` — enable a boolean.
    On(String),

    /// `nokey` — disable a boolean.
    Off(String),

    /// `key!` — toggle a boolean.
    Toggle(String),

    /// `key=value` — assign a value.
    Assign(String, String),
}

/// Resolve abbreviations to the full key, or `None` for unknown keys.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name {
        "font_size" | "fs" => Some("font_size"),
        "tab_size" | "ts" => Some("tab_size"),
        "translate_tabs_to_spaces" | "et" => Some("translate_tabs_to_spaces"),
        "console_max_history_lines" => Some("console_max_history_lines"),
        "auto_complete_disabled" => Some("auto_complete_disabled"),
        "reset_mini_diff_on_save" => Some("reset_mini_diff_on_save"),
        _ => None,
    }
}

/// Returns `true` if `name` is a known boolean key (full name or abbreviation).
#[must_use]
pub fn is_bool_setting(name: &str) -> bool {
    matches!(
        canonical_name(name),
        Some("translate_tabs_to_spaces" | "auto_complete_disabled" | "reset_mini_diff_on_save")
    )
}

/// Parse a whitespace-separated override string into directives.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single override argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Only strip "no" when the rest is a boolean key, so a future key that
    // happens to start with "no" still parses as itself.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_setting(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
