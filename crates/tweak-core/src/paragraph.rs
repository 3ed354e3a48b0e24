//! Paragraph motion — move or extend selections to paragraph boundaries.
//!
//! A paragraph is a run of non-blank lines. Walking the lines between the
//! caret and the edge of the buffer, the finder looks at each pair of
//! adjacent lines (`upper` is the earlier one in the buffer, `lower` the
//! later one):
//!
//! - `lower` **begins** a paragraph when it is non-blank and `upper` is blank.
//!   The boundary is `lower`'s first offset.
//! - `upper` **ends** a paragraph when it is non-blank and `lower` is blank.
//!   The boundary is `upper`'s last offset (before its newline).
//!
//! The [`StopPolicy`] decides which of the two boundary kinds halt the scan.
//! With `ignore_blank_lines` a whitespace-only line counts as blank;
//! without it only a zero-length line does.
//!
//! Both directions share one walk. They differ only in the order the lines
//! are visited and in which line of a pair is `upper`.

use serde::Deserialize;

use crate::host::TextView;
use crate::region::{Point, Region};

// ---------------------------------------------------------------------------
// Policy types
// ---------------------------------------------------------------------------

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the buffer.
    Forward,
    /// Toward the start of the buffer.
    Backward,
}

impl Direction {
    #[must_use]
    pub const fn from_forward(forward: bool) -> Self {
        if forward { Self::Forward } else { Self::Backward }
    }
}

/// Which boundaries stop the scan.
///
/// At least one flag is always set: a policy built with both flags false
/// stops at paragraph beginnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    at_begin: bool,
    at_end: bool,
}

impl StopPolicy {
    /// Stop when entering a paragraph. The default.
    pub const BEGIN: Self = Self {
        at_begin: true,
        at_end: false,
    };

    #[must_use]
    pub const fn new(at_begin: bool, at_end: bool) -> Self {
        Self {
            at_begin: at_begin || !at_end,
            at_end,
        }
    }

    #[inline]
    #[must_use]
    pub const fn at_begin(self) -> bool {
        self.at_begin
    }

    #[inline]
    #[must_use]
    pub const fn at_end(self) -> bool {
        self.at_end
    }
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self::BEGIN
    }
}

// ---------------------------------------------------------------------------
// Finder
// ---------------------------------------------------------------------------

/// Computes paragraph boundaries over a view's lines.
///
/// Holds no state besides the policies; lines are queried from the view on
/// every call and never cached.
pub struct ParagraphFinder<'a, V: TextView + ?Sized> {
    view: &'a V,
    ignore_blank_lines: bool,
    stop: StopPolicy,
}

impl<'a, V: TextView + ?Sized> ParagraphFinder<'a, V> {
    #[must_use]
    pub const fn new(view: &'a V, ignore_blank_lines: bool, stop: StopPolicy) -> Self {
        Self {
            view,
            ignore_blank_lines,
            stop,
        }
    }

    /// The nearest boundary from `start` in `direction`.
    ///
    /// Always returns an offset in `[0, size]`. Forward results are never
    /// before `start` and backward results never after it.
    #[must_use]
    pub fn find(&self, start: Point, direction: Direction) -> Point {
        let size = self.view.size();
        let start = start.min(size);

        let mut lines = match direction {
            Direction::Forward => self.view.lines(Region::new(start, size)),
            Direction::Backward => self.view.lines(Region::new(0, start)),
        };
        if direction == Direction::Backward {
            lines.reverse();
        }

        let found = self.walk(&lines, start, direction);
        let pt = found.unwrap_or_else(|| self.fallback(&lines, start, direction));
        tracing::trace!(start, ?direction, pt, "paragraph boundary");
        pt
    }

    /// Walk adjacent pairs in visiting order and return the first boundary
    /// the policy stops at.
    fn walk(&self, lines: &[Region], start: Point, direction: Direction) -> Option<Point> {
        for pair in lines.windows(2) {
            let (upper, lower) = match direction {
                Direction::Forward => (pair[0], pair[1]),
                Direction::Backward => (pair[1], pair[0]),
            };

            if self.stop.at_begin() && self.begins_paragraph(lower, upper) {
                return Some(lower.begin());
            }

            // Never report the end of the line the caret already sits at.
            if upper.end() != start && self.stop.at_end() && self.ends_paragraph(upper, lower) {
                return Some(upper.end());
            }
        }
        None
    }

    /// Where to land when no interior boundary exists.
    fn fallback(&self, lines: &[Region], start: Point, direction: Direction) -> Point {
        let Some(&last) = lines.last() else {
            return start;
        };

        match direction {
            Direction::Backward => last.begin(),
            Direction::Forward if self.is_blank(last) => self.view.size(),
            Direction::Forward => {
                let end = last.end();
                // A caret parked before the final newline would otherwise
                // never move.
                if end == start {
                    (end + 1).min(self.view.size())
                } else {
                    end
                }
            }
        }
    }

    fn begins_paragraph(&self, line: Region, line_above: Region) -> bool {
        !self.is_blank(line) && self.is_blank(line_above)
    }

    fn ends_paragraph(&self, line: Region, line_below: Region) -> bool {
        !self.is_blank(line) && self.is_blank(line_below)
    }

    fn is_blank(&self, line: Region) -> bool {
        if self.ignore_blank_lines {
            self.view.substr(line).trim().is_empty()
        } else {
            line.is_empty()
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// `move_by_paragraph` — move (or extend) every selection to the next
/// paragraph boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MoveByParagraph {
    /// Grow each selection instead of moving the caret.
    pub extend: bool,
    pub forward: bool,
    /// Treat whitespace-only lines as blank.
    pub ignore_blank_lines: bool,
    pub stop_at_paragraph_begin: bool,
    pub stop_at_paragraph_end: bool,
}

impl Default for MoveByParagraph {
    fn default() -> Self {
        Self {
            extend: false,
            forward: false,
            ignore_blank_lines: true,
            stop_at_paragraph_begin: true,
            stop_at_paragraph_end: false,
        }
    }
}

impl MoveByParagraph {
    #[must_use]
    pub const fn stop_policy(&self) -> StopPolicy {
        StopPolicy::new(self.stop_at_paragraph_begin, self.stop_at_paragraph_end)
    }

    /// Apply the motion to every selection in order, then reveal the first.
    pub fn run<V: TextView + ?Sized>(&self, view: &mut V) {
        let direction = Direction::from_forward(self.forward);
        let targets: Vec<Region> = {
            let finder = ParagraphFinder::new(&*view, self.ignore_blank_lines, self.stop_policy());
            view.sel()
                .iter()
                .map(|sel| {
                    let pt = finder.find(sel.b, direction);
                    if self.extend {
                        Region::new(sel.a, pt)
                    } else {
                        Region::point(pt)
                    }
                })
                .collect()
        };

        view.sel_mut().set(targets);
        if let Some(first) = view.sel().first() {
            view.show(first);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
