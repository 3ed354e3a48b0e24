use crate::view::View;

/// Make the current buffer text the baseline of the incremental diff, so
/// the gutter shows no changes.
pub fn reset_mini_diff(view: &mut View) {
    let text = view.buffer().contents();
    view.set_reference_document(text);
}
