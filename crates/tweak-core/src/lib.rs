//! # tweak-core — Editor commands for tweak
//!
//! Small, independent editor commands and event listeners, written against
//! an explicit host object model:
//!
//! - **[`region`]** — `Region` (anchor/active offsets) and `Point`, char-indexed
//! - **[`buffer`]** — `Buffer` wrapping a rope with line queries and file I/O
//! - **[`host`]** — the `TextView` trait every command is written against
//! - **[`view`]** / **[`window`]** — the in-memory host: views, output panels,
//!   project folders, the console
//! - **[`paragraph`]** — the paragraph boundary finder behind `move_by_paragraph`
//! - **[`location`]** — completions for the find-in-files "Where:" field
//! - **[`commands`]** — command parsing and dispatch, and the remaining commands
//! - **[`events`]** — listeners run on new, load, selection, focus and save
//! - **[`settings`]** — user settings (TOML) and `key=value` overrides

pub mod buffer;
pub mod commands;
pub mod console;
pub mod error;
pub mod events;
pub mod history;
pub mod host;
pub mod location;
pub mod paragraph;
pub mod region;
pub mod selection;
pub mod settings;
pub mod view;
pub mod window;

pub use commands::Command;
pub use error::{Error, Result};
