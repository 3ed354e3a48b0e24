//! Property-based tests for the paragraph boundary finder.
//!
//! Uses proptest to check the finder's bounds and ordering guarantees over
//! arbitrary mixes of text, blank and whitespace-only lines.

use proptest::prelude::*;
use tweak_core::host::TextView;
use tweak_core::paragraph::{Direction, MoveByParagraph, ParagraphFinder, StopPolicy};
use tweak_core::region::Region;
use tweak_core::view::View;

// ============================================================================
// Strategies
// ============================================================================

/// A document built from blank, whitespace-only and text lines.
fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["", "", "  ", "\t", "text", "a b c", "中文", "x"]),
        0..24,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn policy() -> impl Strategy<Value = StopPolicy> {
    (any::<bool>(), any::<bool>()).prop_map(|(begin, end)| StopPolicy::new(begin, end))
}

fn direction() -> impl Strategy<Value = Direction> {
    any::<bool>().prop_map(Direction::from_forward)
}

// ============================================================================
// Finder Properties
// ============================================================================

proptest! {
    /// Every result is a valid offset, even for starts past the end.
    #[test]
    fn results_stay_in_bounds(
        text in document(),
        start in 0usize..200,
        ignore in any::<bool>(),
        stop in policy(),
        dir in direction(),
    ) {
        let view = View::from_text(&text);
        let pt = ParagraphFinder::new(&view, ignore, stop).find(start, dir);
        prop_assert!(pt <= view.size(), "{} past size {}", pt, view.size());
    }

    /// Forward never moves back and backward never moves forward.
    #[test]
    fn results_respect_direction(
        text in document(),
        start in 0usize..200,
        ignore in any::<bool>(),
        stop in policy(),
    ) {
        let view = View::from_text(&text);
        let start = start.min(view.size());
        let finder = ParagraphFinder::new(&view, ignore, stop);

        let back = finder.find(start, Direction::Backward);
        let fwd = finder.find(start, Direction::Forward);
        prop_assert!(back <= start, "backward {} after start {}", back, start);
        prop_assert!(fwd >= start, "forward {} before start {}", fwd, start);
    }

    /// Forward from anywhere but the end always makes progress.
    #[test]
    fn forward_makes_progress(
        text in document(),
        start in 0usize..200,
        ignore in any::<bool>(),
        stop in policy(),
    ) {
        let view = View::from_text(&text);
        prop_assume!(start < view.size());
        let pt = ParagraphFinder::new(&view, ignore, stop).find(start, Direction::Forward);
        prop_assert!(pt > start);
    }

    /// Turning both stops off behaves like the default policy.
    #[test]
    fn both_stops_off_is_default(
        text in document(),
        start in 0usize..200,
        ignore in any::<bool>(),
        dir in direction(),
    ) {
        let view = View::from_text(&text);
        let off = ParagraphFinder::new(&view, ignore, StopPolicy::new(false, false)).find(start, dir);
        let default = ParagraphFinder::new(&view, ignore, StopPolicy::default()).find(start, dir);
        prop_assert_eq!(off, default);
    }

    /// The finder reads the view and nothing else.
    #[test]
    fn finder_is_deterministic(
        text in document(),
        start in 0usize..200,
        stop in policy(),
        dir in direction(),
    ) {
        let view = View::from_text(&text);
        let finder = ParagraphFinder::new(&view, true, stop);
        prop_assert_eq!(finder.find(start, dir), finder.find(start, dir));
    }
}

// ============================================================================
// Command Properties
// ============================================================================

proptest! {
    /// Extending keeps every anchor; moving collapses every selection.
    #[test]
    fn extend_keeps_anchors(
        text in document(),
        carets in prop::collection::vec((0usize..200, 0usize..200), 1..4),
        forward in any::<bool>(),
        extend in any::<bool>(),
    ) {
        let mut view = View::from_text(&text);
        let size = view.size();
        let before: Vec<Region> = carets
            .into_iter()
            .map(|(a, b)| Region::new(a.min(size), b.min(size)))
            .collect();
        view.sel_mut().set(before.clone());

        MoveByParagraph { extend, forward, ..MoveByParagraph::default() }.run(&mut view);

        let after = view.sel().as_slice().to_vec();
        prop_assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(&after) {
            if extend {
                prop_assert_eq!(new.a, old.a);
            } else {
                prop_assert!(new.is_empty());
            }
        }
    }
}
