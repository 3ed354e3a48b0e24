//! Undo/redo history — transaction-based edit tracking.
//!
//! Every buffer mutation made through a [`View`](crate::view::View) is
//! recorded as a reversible [`Edit`] inside the currently open
//! [`Transaction`]. The command dispatcher opens one transaction per text
//! command, so one command is one undo step.
//!
//! ```text
//! history.begin(selections);
//! // view.insert / view.erase record their edits here
//! history.commit(selections);
//! ```
//!
//! Empty transactions (no edits between begin and commit) are discarded.

use crate::buffer::Buffer;
use crate::region::{Point, Region};

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// A single reversible buffer edit.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    /// Text was inserted at `pt`. Undo = erase it.
    Insert { pt: Point, text: String },

    /// Text was erased starting at `pt`. Undo = insert it back.
    Erase { pt: Point, text: String },
}

impl Edit {
    fn span(pt: Point, text: &str) -> Region {
        Region::new(pt, pt + text.chars().count())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A group of edits that undo/redo as one unit, plus the selections to
/// restore on either side of it.
#[derive(Debug, Clone)]
struct Transaction {
    edits: Vec<Edit>,
    sel_before: Vec<Region>,
    sel_after: Vec<Region>,
}

impl Transaction {
    fn undo(&self, buf: &mut Buffer) {
        for edit in self.edits.iter().rev() {
            match edit {
                Edit::Insert { pt, text } => {
                    buf.erase(Edit::span(*pt, text));
                }
                Edit::Erase { pt, text } => {
                    buf.insert(*pt, text);
                }
            }
        }
    }

    fn redo(&self, buf: &mut Buffer) {
        for edit in &self.edits {
            match edit {
                Edit::Insert { pt, text } => {
                    buf.insert(*pt, text);
                }
                Edit::Erase { pt, text } => {
                    buf.erase(Edit::span(*pt, text));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Undo/redo history for one buffer.
///
/// New edits clear the redo stack; branching history is not kept.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
        }
    }

    /// Open a transaction. A transaction still pending is committed first.
    pub fn begin(&mut self, selections: &[Region]) {
        if self.pending.is_some() {
            self.commit(selections);
        }
        self.pending = Some(Transaction {
            edits: Vec::new(),
            sel_before: selections.to_vec(),
            sel_after: selections.to_vec(),
        });
    }

    /// Record an insertion. Ignored outside a transaction.
    pub fn record_insert(&mut self, pt: Point, text: &str) {
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Insert {
                pt,
                text: text.to_string(),
            });
        }
    }

    /// Record an erasure of `text` starting at `pt`. Ignored outside a
    /// transaction.
    pub fn record_erase(&mut self, pt: Point, text: &str) {
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Erase {
                pt,
                text: text.to_string(),
            });
        }
    }

    /// Close the open transaction, dropping it when it recorded nothing.
    pub fn commit(&mut self, selections: &[Region]) {
        if let Some(mut txn) = self.pending.take() {
            if txn.edits.is_empty() {
                return;
            }
            txn.sel_after = selections.to_vec();
            self.redo_stack.clear();
            self.undo_stack.push(txn);
        }
    }

    /// Undo the last transaction and return the selections to restore.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Vec<Region>> {
        if let Some(txn) = self.pending.take() {
            if !txn.edits.is_empty() {
                self.redo_stack.clear();
                self.undo_stack.push(txn);
            }
        }

        let txn = self.undo_stack.pop()?;
        txn.undo(buf);
        let selections = txn.sel_before.clone();
        self.redo_stack.push(txn);
        Some(selections)
    }

    /// Redo the last undone transaction and return the selections to restore.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Vec<Region>> {
        let txn = self.redo_stack.pop()?;
        txn.redo(buf);
        let selections = txn.sel_after.clone();
        self.undo_stack.push(txn);
        Some(selections)
    }

    /// Forget everything, including a pending transaction's edits.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if let Some(txn) = &mut self.pending {
            txn.edits.clear();
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self
                .pending
                .as_ref()
                .is_some_and(|t| !t.edits.is_empty())
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of transactions on the undo stack.
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(history: &mut History, buf: &mut Buffer, pt: Point, text: &str) {
        buf.insert(pt, text);
        history.record_insert(pt, text);
    }

    #[test]
    fn undo_restores_text_and_selection() {
        let mut buf = Buffer::from_text("hello");
        let mut h = History::new();

        h.begin(&[Region::point(5)]);
        insert(&mut h, &mut buf, 5, " world");
        h.commit(&[Region::point(11)]);

        assert_eq!(h.undo(&mut buf), Some(vec![Region::point(5)]));
        assert_eq!(buf.contents(), "hello");
        assert_eq!(h.redo(&mut buf), Some(vec![Region::point(11)]));
        assert_eq!(buf.contents(), "hello world");
    }

    #[test]
    fn erase_round_trips_through_undo() {
        let mut buf = Buffer::from_text("a\nb\nc");
        let mut h = History::new();

        h.begin(&[]);
        let removed = buf.erase(Region::new(2, 4));
        h.record_erase(2, &removed);
        h.commit(&[]);

        assert_eq!(buf.contents(), "a\nc");
        h.undo(&mut buf);
        assert_eq!(buf.contents(), "a\nb\nc");
    }

    #[test]
    fn empty_transaction_is_dropped() {
        let mut h = History::new();
        h.begin(&[]);
        h.commit(&[]);
        assert!(!h.can_undo());
        assert_eq!(h.undo_count(), 0);
    }

    #[test]
    fn recording_outside_transaction_is_ignored() {
        let mut h = History::new();
        h.record_insert(0, "x");
        assert!(!h.can_undo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(&[]);
        insert(&mut h, &mut buf, 0, "a");
        h.commit(&[]);
        h.undo(&mut buf);
        assert!(h.can_redo());

        h.begin(&[]);
        insert(&mut h, &mut buf, 0, "b");
        h.commit(&[]);
        assert!(!h.can_redo());
    }

    #[test]
    fn clear_drops_all_history() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(&[]);
        insert(&mut h, &mut buf, 0, "a");
        h.commit(&[]);
        h.begin(&[]);
        insert(&mut h, &mut buf, 1, "b");

        h.clear();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.undo(&mut buf), None);
        assert_eq!(buf.contents(), "ab");
    }
}
