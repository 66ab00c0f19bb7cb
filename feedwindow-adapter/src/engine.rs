use alloc::vec::Vec;

use feedwindow::{
    Align, ExpandSet, FlatRow, GeometryUnavailable, Keyed, NoopObserver, Paginator, RowGeometry,
    RowKey, RowLifecycle, RowObserver, RowRange, RowState, TreeItem, WindowOptions, Windower,
    first_divergence, flatten, flatten_items,
};

use crate::{MemoryStore, ScrollAnchor, SessionStore};

/// A framework-neutral engine that owns the row sequence, the windower, the materialized-row
/// lifecycle and scroll persistence for one list.
///
/// This type does not hold any UI objects. Hosts drive it by calling:
/// - `set_items` (flat feed) or `set_tree` / `toggle_expand` (comment tree) when data changes
/// - `set_viewport` / `on_scroll` when UI events occur
/// - `layout` after either of the above, then render `for_each_rendered`
/// - `report_measured` once a rendered row's height is known
///
/// Dropping the engine releases every row observation.
pub struct Engine<T: Keyed, O: RowObserver<T::Id> = NoopObserver, S: SessionStore = MemoryStore> {
    windower: Windower,
    /// Source forest; `None` for a flat feed.
    roots: Option<Vec<T>>,
    rows: Vec<FlatRow<T>>,
    expanded: ExpandSet<T::Id>,
    lifecycle: RowLifecycle<T::Id>,
    observer: O,
    anchor: ScrollAnchor<S>,
    viewport_height: u32,
    scroll_offset: u64,
    rendered: Option<RowRange>,
    visible: Option<RowRange>,
    restored: Option<u64>,
    dirty: bool,
}

impl<T: Keyed, O: RowObserver<T::Id>, S: SessionStore> Engine<T, O, S> {
    pub fn new(options: WindowOptions, observer: O, anchor: ScrollAnchor<S>) -> Self {
        Self {
            windower: Windower::new(options),
            roots: None,
            rows: Vec::new(),
            expanded: ExpandSet::new(),
            lifecycle: RowLifecycle::new(),
            observer,
            anchor,
            viewport_height: 0,
            scroll_offset: 0,
            rendered: None,
            visible: None,
            restored: None,
            dirty: true,
        }
    }

    pub fn windower(&self) -> &Windower {
        &self.windower
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn anchor(&self) -> &ScrollAnchor<S> {
        &self.anchor
    }

    pub fn rows(&self) -> &[FlatRow<T>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&FlatRow<T>> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_expanded(&self, id: &T::Id) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand_set(&self) -> &ExpandSet<T::Id> {
        &self.expanded
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Range materialized by the last [`Engine::layout`] (overscan included).
    pub fn rendered_range(&self) -> Option<RowRange> {
        self.rendered
    }

    /// Whether anything changed since the last [`Engine::layout`].
    pub fn needs_layout(&self) -> bool {
        self.dirty
    }

    pub fn max_depth(&self) -> usize {
        self.windower.options().max_depth
    }

    /// Changes how many rows beyond each viewport edge the next [`Engine::layout`]
    /// materializes.
    pub fn set_overscan(&mut self, overscan: usize) {
        if self.windower.overscan() != overscan {
            self.windower.set_overscan(overscan);
            self.dirty = true;
        }
    }

    pub fn set_viewport(&mut self, viewport_height: u32) {
        if self.viewport_height != viewport_height {
            self.viewport_height = viewport_height;
            self.dirty = true;
        }
    }

    /// Call this when the UI reports a scroll offset change.
    ///
    /// The offset is persisted, except before the one-time restore has run: an initial
    /// zero-offset event must not overwrite the stored position.
    pub fn on_scroll(&mut self, scroll_offset: u64) {
        self.scroll_offset = scroll_offset;
        self.dirty = true;
        if self.anchor.restore_attempted() {
            self.anchor.save(scroll_offset);
        }
    }

    /// Computes the rendered range for the current viewport and materializes it.
    ///
    /// The first call that sees a non-empty row sequence restores the persisted scroll
    /// offset; read it back with [`Engine::take_restored_offset`] and apply it to the host's
    /// scroll container.
    pub fn layout(&mut self) -> Option<RowRange> {
        if !self.rows.is_empty() && !self.anchor.restore_attempted() {
            if let Some(offset) = self.anchor.take_restore() {
                self.scroll_offset = offset;
                self.restored = Some(offset);
            }
        }

        let count = self.rows.len();
        let overscan = self.windower.overscan();
        self.visible = self
            .windower
            .viewport_range(self.viewport_height, self.scroll_offset);
        self.rendered = self.visible.map(|range| range.expand(overscan, count));

        let rows = &self.rows;
        self.lifecycle.materialize(
            self.rendered,
            |i| match rows.get(i) {
                Some(row) => row.key.clone(),
                None => RowKey::Position(i),
            },
            &mut self.observer,
        );
        self.dirty = false;
        self.rendered
    }

    /// The offset restored by the last [`Engine::layout`], if it has not been taken yet.
    pub fn take_restored_offset(&mut self) -> Option<u64> {
        self.restored.take()
    }

    /// Visible range for the current viewport (overscan included), without materializing.
    pub fn visible_range(&mut self) -> Option<RowRange> {
        let overscan = self.windower.overscan();
        self.windower
            .visible_range(self.viewport_height, self.scroll_offset, overscan)
    }

    pub fn offset_of(&mut self, index: usize) -> u64 {
        self.windower.offset_of(index)
    }

    pub fn total_height(&mut self) -> u64 {
        self.windower.total_height()
    }

    /// Calls `f` with each rendered row and its geometry.
    pub fn for_each_rendered(&mut self, mut f: impl FnMut(&FlatRow<T>, RowGeometry)) {
        let Some(range) = self.rendered else {
            return;
        };
        let rows = &self.rows;
        self.windower.for_each_row(range, |geometry| {
            if let Some(row) = rows.get(geometry.index) {
                f(row, geometry);
            }
        });
    }

    /// Computes and applies a scroll-to-index immediately.
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.windower.scroll_to_index_offset(
            index,
            align,
            self.viewport_height,
            self.scroll_offset,
        );
        self.scroll_offset = offset;
        self.dirty = true;
        offset
    }

    /// Reports a row's measured height.
    ///
    /// Returns the scroll adjustment the host should apply (non-zero only when a row above
    /// the viewport changed height and `adjust_scroll_on_resize` is enabled).
    pub fn report_measured(&mut self, index: usize, height: u32) -> i64 {
        self.report_geometry(index, Ok(height))
    }

    /// Reports the outcome of a geometry read. A failed read keeps the previous height and
    /// leaves the row pending for the next pass.
    pub fn report_geometry(&mut self, index: usize, result: Result<u32, GeometryUnavailable>) -> i64 {
        let Some(height) = self.lifecycle.on_geometry(index, result) else {
            return 0;
        };
        let Some(delta) = self.windower.measure(index, height) else {
            return 0;
        };
        self.dirty = true;

        if !self.windower.options().adjust_scroll_on_resize {
            return 0;
        }
        if self.windower.offset_of(index) >= self.scroll_offset {
            return 0;
        }
        let before = self.scroll_offset;
        self.scroll_offset = before.saturating_add_signed(delta);
        let applied = if self.scroll_offset >= before {
            (self.scroll_offset - before) as i64
        } else {
            -((before - self.scroll_offset) as i64)
        };
        vtrace!(index, delta, applied, "Engine::report_geometry: adjusted scroll");
        applied
    }

    /// Marks a rendered row's height as provisional after its content changed size.
    pub fn mark_stale(&mut self, index: usize) -> bool {
        let stale = self.lifecycle.mark_stale(index);
        if stale {
            self.dirty = true;
        }
        stale
    }

    pub fn row_state(&self, index: usize) -> Option<RowState> {
        self.lifecycle.state(index)
    }

    /// Rendered rows still waiting for a geometry read.
    pub fn pending_measurements(&self) -> impl Iterator<Item = usize> + '_ {
        self.lifecycle.pending()
    }

    /// Whether the last laid-out viewport is close enough to the end to fetch the next page.
    pub fn should_load_more(&self, has_more: bool) -> bool {
        let Some(visible) = self.visible else {
            return false;
        };
        feedwindow::should_load_more(
            visible.end_index,
            self.rows.len(),
            has_more,
            self.windower.options().load_more_threshold,
        )
    }

    /// Asks `paginator` for more data when the viewport is near the end.
    ///
    /// Returns whether a request was issued.
    pub fn poll_pagination(&mut self, paginator: &mut impl Paginator) -> bool {
        let fire = self.should_load_more(paginator.has_more());
        if fire {
            vdebug!(count = self.rows.len(), "Engine::poll_pagination: requesting more");
            paginator.request_more();
        }
        fire
    }

    /// Releases every row observation and drops rows and heights. Calling it again is a
    /// no-op. The persisted scroll offset is kept.
    pub fn teardown(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.lifecycle.dispose_all(&mut self.observer);
        self.windower.clear();
        self.roots = None;
        self.rows.clear();
        self.rendered = None;
        self.visible = None;
        self.dirty = true;
    }

    /// Installs a new row sequence; measurements of rows `>= pivot` are dropped.
    fn adopt(&mut self, rows: Vec<FlatRow<T>>, pivot: Option<usize>) {
        self.windower.set_rows(rows.iter().map(|row| row.depth));
        if let Some(pivot) = pivot {
            self.windower.invalidate_from(pivot);
        }
        vdebug!(count = rows.len(), ?pivot, "Engine::adopt");
        self.rows = rows;
        self.dirty = true;
    }
}

impl<T: Keyed + Clone, O: RowObserver<T::Id>, S: SessionStore> Engine<T, O, S> {
    /// Replaces the rows of a flat feed.
    ///
    /// Measurements survive for the unchanged prefix, so appending a page keeps every height
    /// already measured.
    pub fn set_items(&mut self, items: &[T]) {
        let rows = flatten_items(items);
        let pivot = first_divergence(&self.rows, &rows);
        self.roots = None;
        if let Some(pivot) = pivot {
            self.lifecycle.dispose_from(pivot, &mut self.observer);
        }
        self.adopt(rows, pivot);
    }
}

impl<T: TreeItem + Clone, O: RowObserver<T::Id>, S: SessionStore> Engine<T, O, S> {
    /// Replaces the comment forest and recomputes the rows under the current expand set.
    pub fn set_tree(&mut self, roots: Vec<T>) {
        self.roots = Some(roots);
        self.recompute(None);
    }

    /// Flips the expansion of `id` and recomputes the rows.
    ///
    /// Returns whether `id` is now expanded. Heights from the toggled row onward are
    /// invalidated, since every row after it may now sit at a different index.
    pub fn toggle_expand(&mut self, id: &T::Id) -> bool {
        let expanded = self.expanded.toggle(id.clone());
        let toggled = self.rows.iter().position(|row| row.key.id() == Some(id));
        vdebug!(?id, expanded, ?toggled, "Engine::toggle_expand");
        self.recompute(toggled);
        expanded
    }

    pub fn set_expand_set(&mut self, expanded: ExpandSet<T::Id>) {
        self.expanded = expanded;
        self.recompute(None);
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        if self.windower.options().max_depth != max_depth {
            self.windower.set_max_depth(max_depth);
            self.recompute(None);
        }
    }

    fn recompute(&mut self, hint: Option<usize>) {
        let Some(roots) = &self.roots else {
            return;
        };
        let rows = flatten(roots, &self.expanded, self.windower.options().max_depth);
        let pivot = first_divergence(&self.rows, &rows).map(|d| hint.map_or(d, |h| h.min(d)));
        self.lifecycle.dispose_all(&mut self.observer);
        self.adopt(rows, pivot);
    }
}

impl<T: Keyed, O: RowObserver<T::Id>, S: SessionStore> Drop for Engine<T, O, S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, O, S> core::fmt::Debug for Engine<T, O, S>
where
    T: Keyed,
    O: RowObserver<T::Id>,
    S: SessionStore,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("rows", &self.rows.len())
            .field("viewport_height", &self.viewport_height)
            .field("scroll_offset", &self.scroll_offset)
            .field("rendered", &self.rendered)
            .field("anchor", &self.anchor.key())
            .finish_non_exhaustive()
    }
}
