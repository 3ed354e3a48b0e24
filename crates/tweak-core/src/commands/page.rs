//! Paging commands.
//!
//! `visual_move_page` pages from where the user is looking: a lone caret
//! that scrolled out of view first jumps to the middle of the viewport.
//! The quick-panel variants step a fixed number of lines.

use serde::Deserialize;

use super::lines::offset_by_rows;
use crate::host::TextView;
use crate::region::Region;

/// Lines moved by the quick-panel page commands when no count is given.
pub const QUICK_PANEL_PAGE: usize = 8;

/// Arguments of `visual_move_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VisualMovePage {
    pub forward: bool,
}

impl Default for VisualMovePage {
    fn default() -> Self {
        Self { forward: true }
    }
}

impl VisualMovePage {
    pub fn run<V: TextView + ?Sized>(self, view: &mut V) {
        let visible = view.visible_region();
        let (first_row, _) = view.rowcol(visible.begin());
        let (last_row, _) = view.rowcol(visible.end());

        if view.sel().len() == 1 && view.sel().first().is_some_and(|sel| !visible.covers(sel)) {
            let centered = view.text_point(usize::midpoint(first_row, last_row), 0);
            tracing::trace!(centered, "caret outside viewport, recentering");
            view.sel_mut().set(vec![Region::point(centered)]);
        }

        move_by_lines(view, last_row - first_row + 1, self.forward);
    }
}

/// Arguments of `quick_panel_page_up` / `quick_panel_page_down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuickPanelPage {
    pub count: usize,
}

impl Default for QuickPanelPage {
    fn default() -> Self {
        Self {
            count: QUICK_PANEL_PAGE,
        }
    }
}

impl QuickPanelPage {
    pub fn run<V: TextView + ?Sized>(self, view: &mut V, forward: bool) {
        move_by_lines(view, self.count, forward);
    }
}

/// Collapse every selection to a caret `rows` lines away from its active
/// end, then reveal the first one.
pub fn move_by_lines<V: TextView + ?Sized>(view: &mut V, rows: usize, forward: bool) {
    let moved: Vec<Region> = view
        .sel()
        .iter()
        .map(|sel| Region::point(offset_by_rows(&*view, sel.b, rows, forward)))
        .collect();
    view.sel_mut().set(moved);
    if let Some(first) = view.sel().first() {
        view.show(first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::View;
    use pretty_assertions::assert_eq;

    fn numbered(rows: usize) -> View {
        let text: String = (0..rows).map(|i| format!("{i:03}\n")).collect();
        View::from_text(&text).with_height(10)
    }

    fn row_of(view: &View) -> usize {
        view.rowcol(view.sel().as_slice()[0].b).0
    }

    #[test]
    fn page_from_visible_caret_moves_one_page() {
        let mut view = numbered(100);
        let start = view.text_point(2, 1);
        view.sel_mut().set(vec![Region::point(start)]);

        VisualMovePage::default().run(&mut view);

        assert_eq!(view.rowcol(view.sel().as_slice()[0].b), (12, 1));
        assert_eq!(view.top_line(), 3);
    }

    #[test]
    fn offscreen_caret_recenters_first() {
        let mut view = numbered(100);
        view.set_top_line(40);
        let start = view.text_point(5, 2);
        view.sel_mut().set(vec![Region::point(start)]);

        VisualMovePage { forward: false }.run(&mut view);

        // Middle of rows 40..=49 is 44; one page up is 34.
        assert_eq!(view.rowcol(view.sel().as_slice()[0].b), (34, 0));
    }

    #[test]
    fn offscreen_carets_are_not_recentered_when_many() {
        let mut view = numbered(100);
        view.set_top_line(40);
        let a = view.text_point(5, 0);
        let b = view.text_point(6, 0);
        view.sel_mut().set(vec![Region::point(a), Region::point(b)]);

        VisualMovePage::default().run(&mut view);

        assert_eq!(row_of(&view), 15);
        assert_eq!(view.sel().len(), 2);
    }

    #[test]
    fn quick_panel_page_steps_count_lines() {
        let mut view = numbered(30);
        let start = view.text_point(10, 0);
        view.sel_mut().set(vec![Region::point(start)]);

        QuickPanelPage::default().run(&mut view, true);
        assert_eq!(row_of(&view), 18);

        QuickPanelPage { count: 3 }.run(&mut view, false);
        assert_eq!(row_of(&view), 15);

        QuickPanelPage { count: 100 }.run(&mut view, false);
        assert_eq!(row_of(&view), 0);
    }

    #[test]
    fn page_args_default_forward() {
        let args: VisualMovePage = serde_json::from_str("{}").unwrap();
        assert!(args.forward);
        let args: QuickPanelPage = serde_json::from_str("{}").unwrap();
        assert_eq!(args.count, 8);
    }
}
