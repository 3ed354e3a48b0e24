//! Completions for the find-in-files "Where:" field.
//!
//! The location field holds a comma-separated list of patterns:
//!
//! ```text
//! /home/me/src, -*/target/*, *.rs, <open folders>, //crates/
//! ```
//!
//! Each pattern may start with an operator (`-` excludes, `*/` matches
//! relative to any folder, `//` anchors at the project folders), and is
//! either a path, a file glob or a `<variable>`.
//!
//! # Completion sources
//!
//! | Source      | Offered                         | Commit                          |
//! |-------------|---------------------------------|---------------------------------|
//! | separator   | always                          | plain insert                    |
//! | directories | always (for the path at caret)  | [`LocationKind::Path`]          |
//! | extensions  | caret not inside a path         | [`LocationKind::File`]          |
//! | operators   | caret not inside a path         | plain insert                    |
//! | variables   | caret not inside a path         | [`LocationKind::Variable`]      |
//!
//! Directory listing errors drop the directory completions and nothing
//! else; the rest of the list is still returned.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use bitflags::bitflags;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::host::{Element, TextView};
use crate::region::{Point, Region, char_regions};

/// A possibly unterminated `<variable>` (or its tail) under the caret.
static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-z ]*>?|[a-z ]*?>").expect("variable pattern is valid"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

bitflags! {
    /// How the host should merge a completion list with its own.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CompletionFlags: u8 {
        /// Hide completions built from words in the buffer.
        const INHIBIT_WORD_COMPLETIONS = 0b0000_0001;
    }
}

/// What a committed completion stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    #[default]
    Unknown,
    /// A directory name inside the path under the caret.
    Path,
    /// A file glob like `*.rs`.
    File,
    /// A `<variable>`.
    Variable,
}

/// Icon group shown next to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Separator,
    Operator,
    Variable,
    Filter,
    Extension,
    Directory,
    Drive,
}

impl CompletionKind {
    /// Single-letter badge.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Separator | Self::Operator => 'o',
            Self::Variable => '$',
            Self::Filter => 'f',
            Self::Extension => 'e',
            Self::Directory | Self::Drive => 'd',
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Separator => "Separator",
            Self::Operator => "Operator",
            Self::Variable => "Variable",
            Self::Filter => "filter",
            Self::Extension => "extension",
            Self::Directory => "directory",
            Self::Drive => "drive",
        }
    }
}

/// Arguments of `find_in_files_commit_location_completion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitLocation {
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub completion: String,
}

/// One entry of the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub trigger: String,
    pub kind: CompletionKind,
    pub details: String,

    /// Command to run instead of inserting `trigger`.
    pub commit: Option<CommitLocation>,
}

impl Completion {
    fn plain(trigger: &str, kind: CompletionKind, details: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            kind,
            details: details.to_string(),
            commit: None,
        }
    }

    fn location(trigger: &str, completion: Option<&str>, location: LocationKind, kind: CompletionKind, details: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            kind,
            details: details.to_string(),
            commit: Some(CommitLocation {
                kind: location,
                completion: completion.unwrap_or(trigger).to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionList {
    pub items: Vec<Completion>,
    pub flags: CompletionFlags,
}

impl CompletionList {
    /// Triggers in popup order.
    #[must_use]
    pub fn triggers(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.trigger.as_str()).collect()
    }

    #[must_use]
    pub fn get(&self, trigger: &str) -> Option<&Completion> {
        self.items.iter().find(|c| c.trigger == trigger)
    }
}

/// The window state completions draw on.
#[derive(Debug, Clone, Default)]
pub struct LocationContext<'a> {
    pub folders: Vec<&'a Path>,
    pub open_files: Vec<&'a Path>,
    pub active_file: Option<&'a Path>,
}

// ---------------------------------------------------------------------------
// Pattern scanning
// ---------------------------------------------------------------------------

/// The pattern around `pt`: from after the previous `,` (skipping blanks
/// and the `-` / `*/` operators) to before the next `,`, trailing blanks
/// excluded.
fn pattern_at(chars: &[char], pt: Point) -> Region {
    let pt = pt.min(chars.len());
    let mut start = chars[..pt].iter().rposition(|&c| c == ',').map_or(0, |i| i + 1);
    let end = chars[pt..].iter().position(|&c| c == ',').map_or(chars.len(), |i| pt + i);

    loop {
        while start < end && chars[start].is_whitespace() {
            start += 1;
        }
        if chars.get(start) == Some(&'-') {
            start += 1;
        } else if chars[start..end].starts_with(&['*', '/']) {
            start += 2;
        } else {
            break;
        }
    }

    let mut trimmed = end;
    while trimmed > start && chars[trimmed - 1].is_whitespace() {
        trimmed -= 1;
    }
    Region::new(start, trimmed)
}

/// The path fragment whose text covers the char before `pt`.
fn path_at(chars: &[char], pt: Point) -> Option<Region> {
    let check = pt.saturating_sub(1);
    let pattern = pattern_at(chars, pt);
    let text = &chars[pattern.begin()..pattern.end()];
    let is_path = text.first() != Some(&'<') && text.iter().any(|&c| c == '/' || c == '\\');
    (is_path && pattern.begin() <= check && check < pattern.end()).then_some(pattern)
}

fn buffer_chars<V: TextView + ?Sized>(view: &V) -> Vec<char> {
    view.substr(Region::new(0, view.size())).chars().collect()
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Completions for the caret at `pt` in a location field.
///
/// Returns `None` when `view` is not a location field or auto-complete is
/// disabled.
#[must_use]
pub fn query_completions<V: TextView + ?Sized>(
    view: &V,
    ctx: &LocationContext<'_>,
    pt: Point,
) -> Option<CompletionList> {
    if view.element() != Element::LocationInput {
        return None;
    }
    if view.settings().auto_complete_disabled {
        tracing::trace!("auto-complete disabled, no location completions");
        return None;
    }

    let chars = buffer_chars(view);
    let pt = pt.min(chars.len());

    let mut items = vec![Completion::plain(",", CompletionKind::Separator, "Separates patterns")];

    match path_completions(&chars, ctx, pt) {
        Ok(paths) => items.extend(paths),
        Err(e) => tracing::warn!(error = %e, "listing folders for location completions failed"),
    }

    if path_at(&chars, pt).is_none() {
        items.extend(file_completions(ctx));
        items.extend(variable_completions());
        if let Some(folder) = ctx.active_file.and_then(Path::parent) {
            items.push(Completion::location(
                "<current folder>",
                Some(&folder.display().to_string()),
                LocationKind::Variable,
                CompletionKind::Variable,
                "Search in current folder",
            ));
        }
    }

    tracing::debug!(count = items.len(), pt, "location completions");
    Some(CompletionList {
        items,
        flags: CompletionFlags::INHIBIT_WORD_COMPLETIONS,
    })
}

fn variable_completions() -> Vec<Completion> {
    use CompletionKind::{Filter, Operator, Variable};
    use LocationKind::Variable as Var;

    vec![
        Completion::plain("-", Operator, "Exclude matching patterns from search"),
        Completion::plain("//", Operator, "Match relative to project folders"),
        Completion::plain("*/", Operator, "Match relative to any folder"),
        Completion::location("<current file>", None, Var, Variable, "Search in active file."),
        Completion::location("<open files>", None, Var, Variable, "Search in all open files."),
        Completion::location("<open folders>", None, Var, Variable, "Search in all open folders."),
        Completion::location("<project filters>", None, Var, Filter, "Apply project specific filter settings."),
    ]
}

/// `*.<ext>` for every extension among the open files, plus `*.*`.
fn file_completions(ctx: &LocationContext<'_>) -> Vec<Completion> {
    let extensions: BTreeSet<String> = std::iter::once("*".to_string())
        .chain(
            ctx.open_files
                .iter()
                .filter_map(|f| f.extension())
                .map(|e| e.to_string_lossy().into_owned())
                .filter(|e| !e.is_empty()),
        )
        .collect();

    extensions
        .into_iter()
        .map(|ext| {
            Completion::location(
                &format!("*.{ext}"),
                None,
                LocationKind::File,
                CompletionKind::Extension,
                &format!("include <em>{ext}</em> files."),
            )
        })
        .collect()
}

/// Folders whose subdirectories complete the path before `pt`.
fn completion_folders(chars: &[char], ctx: &LocationContext<'_>, pt: Point) -> Vec<PathBuf> {
    let Some(path) = path_at(chars, pt) else {
        return vec![PathBuf::from("/")];
    };
    let typed: String = chars[path.begin()..pt].iter().collect();
    let typed = typed.replace('\\', "/");

    if let Some(relative) = typed.strip_prefix("//") {
        return match relative.rsplit_once('/') {
            None => ctx.folders.iter().map(|f| f.to_path_buf()).collect(),
            Some((dir, _)) => ctx
                .folders
                .iter()
                .map(|root| root.join(dir))
                .filter(|f| f.is_dir())
                .collect(),
        };
    }

    let dir = typed.rsplit_once('/').map_or(typed.as_str(), |(dir, _)| dir);
    let folder = PathBuf::from(format!("{dir}/"));
    if folder.is_absolute() {
        vec![folder]
    } else {
        // TODO: complete relative paths against every project folder.
        Vec::new()
    }
}

fn path_completions(chars: &[char], ctx: &LocationContext<'_>, pt: Point) -> io::Result<Vec<Completion>> {
    let folders = completion_folders(chars, ctx, pt);

    if cfg!(windows) && folders.len() == 1 && !has_drive(&folders[0]) {
        // Drive letters only make sense at the start of a pattern.
        if pt.saturating_sub(pattern_at(chars, pt).begin()) > 1 {
            return Ok(Vec::new());
        }
        return Ok(drives()
            .map(|d| {
                Completion::location(
                    &format!("{d}:"),
                    None,
                    LocationKind::Path,
                    CompletionKind::Drive,
                    "",
                )
            })
            .collect());
    }

    let mut names = BTreeSet::new();
    for folder in &folders {
        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            if entry.path().is_dir() {
                names.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }
    }

    Ok(names
        .iter()
        .map(|name| Completion::location(name, None, LocationKind::Path, CompletionKind::Directory, ""))
        .collect())
}

fn has_drive(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::Prefix(_)))
}

/// Drive letters with a root directory.
fn drives() -> impl Iterator<Item = char> {
    ('A'..='Z').filter(|d| Path::new(&format!("{d}:\\")).is_dir())
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Apply a committed location completion at the first caret.
///
/// Returns `true` when the host should open the completion popup again
/// (after descending into a directory).
pub fn commit_location<V: TextView + ?Sized>(view: &mut V, commit: &CommitLocation) -> bool {
    let Some(first) = view.sel().first() else {
        return false;
    };
    let pt = first.b;

    match commit.kind {
        LocationKind::File => {
            view.insert(pt, &commit.completion);
            false
        }
        LocationKind::Path => {
            commit_path(view, pt, &commit.completion);
            true
        }
        LocationKind::Variable => {
            commit_variable(view, pt, &commit.completion);
            false
        }
        LocationKind::Unknown => false,
    }
}

fn commit_path<V: TextView + ?Sized>(view: &mut V, pt: Point, completion: &str) {
    let chars = buffer_chars(view);
    let path = path_at(&chars, pt).map(|reg| {
        // The rest of the old path after the caret is replaced.
        if reg.end() > pt {
            view.erase(Region::new(pt, reg.end()));
        }
        Region::new(reg.begin(), pt)
    });

    let text = if cfg!(windows) {
        let sep = match path {
            Some(reg) if view.substr(reg).contains('/') => '/',
            _ => '\\',
        };
        format!("{completion}{sep}")
    } else if path.is_none_or(|reg| reg.a == pt) {
        format!("/{completion}/")
    } else {
        format!("{completion}/")
    };

    view.insert(pt, &text);
}

fn commit_variable<V: TextView + ?Sized>(view: &mut V, pt: Point, completion: &str) {
    let text = view.substr(Region::new(0, view.size()));
    let found = char_regions(&text, VARIABLE.find_iter(&text).map(|m| m.range()))
        .into_iter()
        .find(|reg| reg.contains(pt));

    match found {
        Some(mut reg) => {
            if view.substr(Region::new(reg.a, reg.a + 1)) == " " {
                reg.a += 1;
            }
            view.replace(reg, completion);
        }
        None => {
            view.insert(pt, completion);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
