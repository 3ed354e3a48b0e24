//! Selection set — the carets and selections of one view.
//!
//! A view always has an ordered list of [`Region`]s. Each region's `a` is
//! the anchor (the end that stays put) and `b` the active end (where the
//! caret blinks). Commands usually snapshot the set, clear it, and add the
//! new regions back in the original order.
//!
//! Overlapping regions are kept as given; merging is the host's business.

use crate::region::{Point, Region};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    regions: Vec<Region>,
}

impl SelectionSet {
    /// An empty selection set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    /// A set holding a single caret at `pt`.
    #[must_use]
    pub fn caret(pt: Point) -> Self {
        Self {
            regions: vec![Region::point(pt)],
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The region at `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Region> {
        self.regions.get(index).copied()
    }

    /// The first region. This is the "primary" selection.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<Region> {
        self.regions.first().copied()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<Region> {
        self.regions.last().copied()
    }

    /// All regions, in order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.iter().copied()
    }

    /// Remove every region.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Append a region.
    pub fn add(&mut self, region: impl Into<Region>) {
        self.regions.push(region.into());
    }

    /// Append several regions, in order.
    pub fn add_all(&mut self, regions: impl IntoIterator<Item = Region>) {
        self.regions.extend(regions);
    }

    /// Replace the whole set.
    pub fn set(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    /// Clamp every region into `[0, size]`. Called after edits that may have
    /// shrunk the buffer underneath the selections.
    pub fn clamp(&mut self, size: usize) {
        for r in &mut self.regions {
            r.a = r.a.min(size);
            r.b = r.b.min(size);
        }
    }
}

impl FromIterator<Region> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
