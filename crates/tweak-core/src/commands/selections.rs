use crate::host::TextView;

/// Keep only the last selection and scroll to it.
pub fn single_last_selection<V: TextView + ?Sized>(view: &mut V) {
    let Some(last) = view.sel().last() else {
        return;
    };
    view.sel_mut().set(vec![last]);
    view.show(last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::view::View;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_last_selection() {
        let mut view = View::from_text("abc def ghi");
        view.sel_mut()
            .set(vec![Region::new(0, 3), Region::new(4, 7), Region::new(8, 11)]);

        single_last_selection(&mut view);

        assert_eq!(view.sel().as_slice(), &[Region::new(8, 11)]);
    }

    #[test]
    fn empty_selection_is_noop() {
        let mut view = View::from_text("abc");
        view.sel_mut().clear();
        single_last_selection(&mut view);
        assert!(view.sel().is_empty());
    }
}
