/// Default distance (in rows) from the end of the data set at which more data is requested.
pub const DEFAULT_THRESHOLD_ROWS: usize = 5;

/// Returns `true` when the trailing edge of the rendered rows is within `threshold_rows` of
/// the end of the data set and the data source has more to give.
///
/// Pure: repeated calls with the same arguments return the same answer. Debouncing repeated
/// requests is the caller's job.
pub fn should_load_more(
    end_index: usize,
    item_count: usize,
    has_more: bool,
    threshold_rows: usize,
) -> bool {
    has_more && item_count.saturating_sub(end_index) <= threshold_rows
}

/// The pagination collaborator.
pub trait Paginator {
    fn has_more(&self) -> bool;
    fn request_more(&mut self);
}

impl<P: Paginator + ?Sized> Paginator for &mut P {
    fn has_more(&self) -> bool {
        (**self).has_more()
    }

    fn request_more(&mut self) {
        (**self).request_more();
    }
}
