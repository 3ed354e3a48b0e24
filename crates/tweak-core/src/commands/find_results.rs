//! Navigation inside find-in-files output.
//!
//! Find results look like this:
//!
//! ```text
//! Searching 12 files for "needle"
//!
//! /src/lib.rs:
//!    10      let needle = 1;
//!    11:     other(needle);
//!
//! 2 matches in 1 file
//! ```
//!
//! File headers are unindented lines ending in `:`; match positions are
//! attached to the view as the `"match"` regions by whoever produced the
//! output.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::host::TextView;
use crate::region::{Point, Region, char_regions};

/// Region key under which match positions are stored.
pub const MATCH_REGIONS: &str = "match";

static FILE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\S.*):$").expect("file header pattern is valid"));

static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+).+").expect("line number pattern is valid"));

static FILE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+):$").expect("file line pattern is valid"));

/// What `findresults_goto_*` jumps between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GotoTarget {
    File,
    Match,
}

/// Arguments of `findresults_goto_file` / `findresults_goto_match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FindResultsGoto {
    pub forward: bool,
}

impl Default for FindResultsGoto {
    fn default() -> Self {
        Self { forward: true }
    }
}

/// Target offsets of one view, valid for one change count.
#[derive(Debug, Clone, Default)]
pub struct TargetCache {
    revision: Option<u64>,
    begins: Vec<Point>,
    ends: Vec<Point>,
}

impl TargetCache {
    fn refresh<V: TextView + ?Sized>(&mut self, view: &V, target: GotoTarget) {
        let revision = view.change_count();
        if self.revision == Some(revision) {
            return;
        }
        let regions = match target {
            GotoTarget::File => file_headers(view),
            GotoTarget::Match => view.get_regions(MATCH_REGIONS),
        };
        tracing::trace!(?target, count = regions.len(), revision, "refreshed find results targets");
        self.revision = Some(revision);
        self.begins = regions.iter().map(|r| r.a).collect();
        self.ends = regions.iter().map(|r| r.b).collect();
    }

    /// Index of the target after (or before) `pt`, wrapping around.
    fn next(&self, pt: Point, forward: bool) -> Option<usize> {
        if self.begins.is_empty() {
            return None;
        }
        if forward {
            let idx = self.begins.partition_point(|&b| b <= pt);
            Some(if idx >= self.begins.len() { 0 } else { idx })
        } else {
            let idx = self.ends.partition_point(|&e| e < pt);
            Some(idx.checked_sub(1).unwrap_or(self.begins.len() - 1))
        }
    }
}

/// File names in the header lines, without the trailing `:`.
fn file_headers<V: TextView + ?Sized>(view: &V) -> Vec<Region> {
    let text = view.substr(Region::new(0, view.size()));
    let names = FILE_HEADER
        .captures_iter(&text)
        .filter_map(|c| c.get(1))
        .map(|m| m.range());
    char_regions(&text, names)
}

impl FindResultsGoto {
    /// Select the next (or previous) target after the first caret.
    /// Does nothing when the view has no targets.
    pub fn run<V: TextView + ?Sized>(self, view: &mut V, target: GotoTarget, cache: &mut TargetCache) {
        let pt = view.sel().first().map_or(0, |s| s.b);
        cache.refresh(&*view, target);

        let Some(idx) = cache.next(pt, self.forward) else {
            tracing::debug!(?target, "no find results targets");
            return;
        };
        let found = Region::new(cache.begins[idx], cache.ends[idx]);
        view.sel_mut().set(vec![found]);
        view.show(found);
    }
}

// ---------------------------------------------------------------------------
// Opening files
// ---------------------------------------------------------------------------

/// `file:line` (or just `file`) for every selection, in selection order.
///
/// The file is the nearest header line at or above the selection that
/// names an existing path. The line number comes from the selection's own
/// line.
#[must_use]
pub fn open_file_targets<V: TextView + ?Sized>(view: &V) -> Vec<String> {
    view.sel()
        .iter()
        .filter_map(|sel| {
            let file = file_above(view, sel)?;
            Some(match line_number(view, sel) {
                Some(line) => format!("{file}:{line}"),
                None => file,
            })
        })
        .collect()
}

fn line_number<V: TextView + ?Sized>(view: &V, sel: Region) -> Option<String> {
    let text = view.substr(view.line(sel.begin()));
    LINE_NUMBER
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn file_above<V: TextView + ?Sized>(view: &V, sel: Region) -> Option<String> {
    let mut line = view.line(sel.begin());
    loop {
        let text = view.substr(line);
        if let Some(name) = FILE_LINE.captures(&text).and_then(|c| c.get(1)) {
            if Path::new(name.as_str()).exists() {
                return Some(name.as_str().to_string());
            }
        }
        if line.begin() == 0 {
            return None;
        }
        line = view.line(line.begin() - 1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
