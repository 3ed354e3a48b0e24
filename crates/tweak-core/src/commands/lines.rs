//! Line and character insertion commands.
//!
//! All of these visit selections by index and re-read each one after the
//! previous edit, so offsets shifted by earlier inserts are respected.

use serde::Deserialize;
use unicode_width::UnicodeWidthChar;

use crate::host::TextView;
use crate::region::{Point, Region};

/// Insert an empty line above the line of every selection.
pub fn insert_line_before<V: TextView + ?Sized>(view: &mut V) {
    for i in 0..view.sel().len() {
        let Some(sel) = view.sel().get(i) else { break };
        let (row, _) = view.rowcol(sel.begin());
        let pt = view.text_point(row, 0);
        view.insert(pt, "\n");
    }
}

/// Delete the line above the line of every selection, if there is one.
pub fn delete_line_before<V: TextView + ?Sized>(view: &mut V) {
    for i in 0..view.sel().len() {
        let Some(sel) = view.sel().get(i) else { break };
        let (row, _) = view.rowcol(sel.begin());
        if row == 0 {
            continue;
        }
        let above = view.full_line(view.text_point(row - 1, 0));
        view.erase(above);
    }
}

/// Insert a literal tab at the first selection, whatever
/// `translate_tabs_to_spaces` says.
pub fn insert_real_tab<V: TextView + ?Sized>(view: &mut V) {
    let Some(first) = view.sel().first() else {
        return;
    };
    view.insert(first.begin(), "\t");
}

// ---------------------------------------------------------------------------
// Typed insertion
// ---------------------------------------------------------------------------

/// Arguments of `insert`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Insert {
    pub characters: String,
}

impl Insert {
    /// Replace every selection with `characters`, leaving carets after the
    /// inserted text. Tabs expand to spaces when the view translates them.
    pub fn run<V: TextView + ?Sized>(&self, view: &mut V) {
        for i in 0..view.sel().len() {
            let Some(sel) = view.sel().get(i) else { break };
            if !sel.is_empty() {
                view.erase(sel);
            }
            let pt = sel.begin();

            let settings = view.settings();
            let text = if settings.translate_tabs_to_spaces && self.characters.contains('\t') {
                let tab_size = settings.tab_size;
                let line = view.line(pt);
                let col = display_col(&view.substr(Region::new(line.begin(), pt)), tab_size);
                expand_tabs(&self.characters, col, tab_size)
            } else {
                self.characters.clone()
            };
            view.insert(pt, &text);
        }
    }
}

/// Display width of `prefix`, with tabs advancing to the next tab stop.
fn display_col(prefix: &str, tab_size: usize) -> usize {
    let tab = tab_size.max(1);
    prefix.chars().fold(0, |col, ch| match ch {
        '\t' => (col / tab + 1) * tab,
        _ => col + ch.width().unwrap_or(0),
    })
}

/// Replace tabs in `text` with spaces up to the next tab stop, starting at
/// display column `col`.
fn expand_tabs(text: &str, mut col: usize, tab_size: usize) -> String {
    let tab = tab_size.max(1);
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => {
                let n = tab - col % tab;
                out.extend(std::iter::repeat_n(' ', n));
                col += n;
            }
            '\n' => {
                out.push(ch);
                col = 0;
            }
            _ => {
                out.push(ch);
                col += ch.width().unwrap_or(0);
            }
        }
    }
    out
}

/// Offset `rows` rows away from `pt`, keeping the column where the target
/// line is long enough.
pub(crate) fn offset_by_rows<V: TextView + ?Sized>(view: &V, pt: Point, rows: usize, forward: bool) -> Point {
    let (row, col) = view.rowcol(pt);
    let (last_row, _) = view.rowcol(view.size());
    let target = if forward {
        (row + rows).min(last_row)
    } else {
        row.saturating_sub(rows)
    };
    view.text_point(target, col)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
