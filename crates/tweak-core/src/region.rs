//! Offset regions.
//!
//! All coordinates are **char offsets** into the buffer, 0-indexed. Offset 0
//! sits before the first character and `size()` sits after the last one.
//! Rows and columns only appear at the edges (status line, `text_point`),
//! and the 1-indexed conversion for humans never belongs here.

use std::fmt;

/// A char offset into a buffer.
pub type Point = usize;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A span of text between two offsets.
///
/// `a` is the anchor and `b` the active end (where the caret is drawn). The
/// two may be in either order: a selection dragged backwards has `b < a`.
/// Use [`begin`](Self::begin) / [`end`](Self::end) for the ordered bounds.
///
/// The region covers the text between `begin` and `end`. Both edges count
/// as inside for [`contains`](Self::contains), so a caret at either end of
/// a selection is within it. A caret is a region with `a == b`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub a: Point,
    pub b: Point,
}

impl Region {
    /// Create a region from anchor and active end.
    #[inline]
    #[must_use]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// A zero-width region (caret) at `pt`.
    #[inline]
    #[must_use]
    pub const fn point(pt: Point) -> Self {
        Self { a: pt, b: pt }
    }

    /// The smaller of the two offsets.
    #[inline]
    #[must_use]
    pub const fn begin(self) -> Point {
        if self.a < self.b { self.a } else { self.b }
    }

    /// The larger of the two offsets.
    #[inline]
    #[must_use]
    pub const fn end(self) -> Point {
        if self.a < self.b { self.b } else { self.a }
    }

    /// Number of chars covered.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        self.end() - self.begin()
    }

    /// True when the region covers no chars.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.a == self.b
    }

    /// True when `pt` lies within `[begin, end]`, edges included.
    ///
    /// Carets at either edge of a region count as inside it, which is what
    /// "the caret is in this word" means to a user.
    #[inline]
    #[must_use]
    pub const fn contains(self, pt: Point) -> bool {
        pt >= self.begin() && pt <= self.end()
    }

    /// True when `other` lies entirely within this region.
    #[inline]
    #[must_use]
    pub const fn covers(self, other: Self) -> bool {
        other.begin() >= self.begin() && other.end() <= self.end()
    }

    /// True when the two regions share at least one offset.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.begin() <= other.end() && other.begin() <= self.end()
    }

    /// The same span with `a <= b`.
    #[inline]
    #[must_use]
    pub const fn ordered(self) -> Self {
        Self {
            a: self.begin(),
            b: self.end(),
        }
    }
}

impl From<Point> for Region {
    fn from(pt: Point) -> Self {
        Self::point(pt)
    }
}

impl From<(Point, Point)> for Region {
    fn from((a, b): (Point, Point)) -> Self {
        Self::new(a, b)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Region({}, {})", self.a, self.b)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}", self.a)
        } else {
            write!(f, "{}:{}", self.a, self.b)
        }
    }
}

/// Convert byte ranges into `text` (as produced by `regex`) into char
/// regions. The ranges must be sorted by start and lie on char boundaries.
pub fn char_regions<I>(text: &str, byte_ranges: I) -> Vec<Region>
where
    I: IntoIterator<Item = std::ops::Range<usize>>,
{
    let mut byte = 0;
    let mut chars = 0;
    let mut advance = |to: usize| {
        if to >= byte {
            chars += text[byte..to].chars().count();
        } else {
            chars -= text[to..byte].chars().count();
        }
        byte = to;
        chars
    };
    byte_ranges
        .into_iter()
        .map(|range| {
            let a = advance(range.start);
            let b = advance(range.end);
            Region::new(a, b)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_region_is_empty() {
        let r = Region::point(4);
        assert!(r.is_empty());
        assert_eq!(r.size(), 0);
        assert_eq!(r.begin(), 4);
        assert_eq!(r.end(), 4);
    }

    #[test]
    fn reversed_region_orders_bounds() {
        let r = Region::new(9, 2);
        assert_eq!(r.begin(), 2);
        assert_eq!(r.end(), 9);
        assert_eq!(r.size(), 7);
        assert_eq!(r.ordered(), Region::new(2, 9));
    }

    #[test]
    fn contains_includes_both_edges() {
        let r = Region::new(3, 6);
        assert!(!r.contains(2));
        assert!(r.contains(3));
        assert!(r.contains(6));
        assert!(!r.contains(7));
    }

    #[test]
    fn covers_and_intersects() {
        let outer = Region::new(0, 10);
        assert!(outer.covers(Region::new(2, 5)));
        assert!(!outer.covers(Region::new(8, 12)));
        assert!(outer.intersects(Region::new(8, 12)));
        assert!(outer.intersects(Region::point(10)));
        assert!(!outer.intersects(Region::new(11, 12)));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Region::point(5).to_string(), "5");
        assert_eq!(Region::new(5, 2).to_string(), "5:2");
        assert_eq!(format!("{:?}", Region::new(1, 3)), "Region(1, 3)");
    }

    #[test]
    fn conversions() {
        assert_eq!(Region::from(3), Region::point(3));
        assert_eq!(Region::from((4, 1)), Region::new(4, 1));
    }

    #[test]
    fn char_regions_count_chars_not_bytes() {
        let text = "é <a> ü <b>";
        let starts: Vec<_> = text.match_indices('<').map(|(i, _)| i..i + 3).collect();
        assert_eq!(char_regions(text, starts), vec![Region::new(2, 5), Region::new(8, 11)]);
    }
}
