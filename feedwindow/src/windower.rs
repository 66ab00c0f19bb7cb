use alloc::vec::Vec;
use core::iter;

use crate::heights::HeightCache;
use crate::offsets::OffsetTable;
use crate::{Align, RowGeometry, RowRange, WindowOptions};

/// Maps between index space and pixel space for a list of variable-height rows.
///
/// The windower is UI-agnostic: it never reads geometry itself. The host supplies viewport
/// height and scroll offset per query and reports measured heights back through
/// [`Windower::measure`]. Queries take `&mut self` because the offset table is rebuilt lazily
/// on read; a measurement is therefore always visible to the next query.
#[derive(Clone, Debug)]
pub struct Windower {
    options: WindowOptions,
    heights: HeightCache,
    offsets: OffsetTable,
}

impl Windower {
    pub fn new(options: WindowOptions) -> Self {
        vdebug!(
            base_size = options.estimate.base_size,
            overscan = options.overscan,
            drift_tolerance = options.drift_tolerance,
            "Windower::new"
        );
        Self {
            heights: HeightCache::new(options.estimate, options.drift_tolerance),
            offsets: OffsetTable::new(),
            options,
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn heights(&self) -> &HeightCache {
        &self.heights
    }

    pub fn count(&self) -> usize {
        self.heights.len()
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
    }

    /// Updates the depth cap carried in the options. The windower itself does not flatten;
    /// owners that do read the cap back from [`Windower::options`].
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.options.max_depth = max_depth;
    }

    /// Resizes a flat list (every row at depth 0).
    pub fn set_count(&mut self, count: usize) {
        self.set_rows(iter::repeat_n(0, count));
    }

    /// Adopts a new row set given each row's depth.
    ///
    /// Returns the first index whose offset was invalidated.
    pub fn set_rows(&mut self, depths: impl IntoIterator<Item = usize>) -> usize {
        let first_changed = self.heights.set_depths(depths);
        self.offsets.resize(self.heights.len());
        self.offsets.invalidate_from(first_changed);
        vtrace!(count = self.count(), first_changed, "Windower::set_rows");
        first_changed
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        (index < self.count()).then(|| self.heights.get(index))
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.heights.is_measured(index)
    }

    /// Writes a measured height through the cache.
    ///
    /// Returns the applied delta when the row's height changed (offsets after it moved).
    pub fn measure(&mut self, index: usize, height: u32) -> Option<i64> {
        let delta = self.heights.set(index, height)?;
        self.offsets.invalidate_from(index);
        Some(delta)
    }

    /// Drops measurements of every row `>= pivot` (rows were inserted or removed before them).
    pub fn invalidate_from(&mut self, pivot: usize) -> usize {
        let cleared = self.heights.invalidate_from(pivot);
        self.offsets.invalidate_from(pivot);
        cleared
    }

    /// Pixel offset of row `index`. Indexes past the end map to [`Self::total_height`].
    pub fn offset_of(&mut self, index: usize) -> u64 {
        self.offsets.start_of(index, &self.heights)
    }

    pub fn total_height(&mut self) -> u64 {
        self.offsets.total(&self.heights)
    }

    pub fn item(&mut self, index: usize) -> Option<RowGeometry> {
        if index >= self.count() {
            return None;
        }
        Some(RowGeometry {
            index,
            start: self.offset_of(index),
            size: self.heights.get(index),
        })
    }

    pub fn max_scroll_offset(&mut self, viewport_height: u32) -> u64 {
        self.total_height().saturating_sub(viewport_height as u64)
    }

    pub fn clamp_scroll_offset(&mut self, offset: u64, viewport_height: u32) -> u64 {
        offset.min(self.max_scroll_offset(viewport_height))
    }

    pub fn index_at_offset(&mut self, offset: u64) -> Option<usize> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        Some(self.offsets.lower_bound(offset, &self.heights).min(count - 1))
    }

    /// Rows that must be materialized for the given viewport, including `overscan` rows on
    /// each side.
    ///
    /// Returns `None` for an empty list. A `scroll_offset` past the scrollable extent is
    /// clamped, so the result is always the last valid range rather than an error.
    pub fn visible_range(
        &mut self,
        viewport_height: u32,
        scroll_offset: u64,
        overscan: usize,
    ) -> Option<RowRange> {
        let count = self.count();
        let visible = self.viewport_range(viewport_height, scroll_offset)?;
        Some(visible.expand(overscan, count))
    }

    /// Rows intersecting the viewport, without overscan.
    pub fn viewport_range(&mut self, viewport_height: u32, scroll_offset: u64) -> Option<RowRange> {
        if self.count() == 0 {
            return None;
        }

        // Only a scan that runs off the end needs the total height, so the common case never
        // forces the offset table past the viewport.
        let (mut range, overran) = self.scan(scroll_offset, viewport_height);
        if overran {
            let clamped = self.clamp_scroll_offset(scroll_offset, viewport_height);
            range = self.scan(clamped, viewport_height).0;
        }

        vtrace!(
            viewport_height,
            scroll_offset,
            start = range.start_index,
            end = range.end_index,
            "Windower::viewport_range"
        );
        Some(range)
    }

    /// Finds the row containing `scroll_offset`, then walks forward until the accumulated
    /// height passes the viewport's bottom edge. The flag reports whether the viewport
    /// extends past the last row.
    fn scan(&mut self, scroll_offset: u64, viewport_height: u32) -> (RowRange, bool) {
        let count = self.count();
        let bottom = scroll_offset.saturating_add(viewport_height as u64);

        let first = self.offsets.lower_bound(scroll_offset, &self.heights);
        let start = first.min(count - 1);
        let mut end = start;
        let mut acc = self.offsets.end_of(start, &self.heights);
        while end + 1 < count && acc <= bottom {
            end += 1;
            acc = acc.saturating_add(self.heights.get(end) as u64);
        }

        let overran = first >= count || acc <= bottom;
        (
            RowRange {
                start_index: start,
                end_index: end,
            },
            overran,
        )
    }

    /// Calls `f` with the geometry of every row in `range`, walking offsets incrementally.
    pub fn for_each_row(&mut self, range: RowRange, mut f: impl FnMut(RowGeometry)) {
        let count = self.count();
        if range.start_index >= count {
            return;
        }
        let end = range.end_index.min(count - 1);
        let mut start = self.offset_of(range.start_index);
        for index in range.start_index..=end {
            let size = self.heights.get(index);
            f(RowGeometry { index, start, size });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects row geometry for `range` into `out` (clears `out` first).
    pub fn collect_rows(&mut self, range: RowRange, out: &mut Vec<RowGeometry>) {
        out.clear();
        self.for_each_row(range, |row| out.push(row));
    }

    /// Scroll offset that brings `index` into view with the given alignment (clamped).
    pub fn scroll_to_index_offset(
        &mut self,
        index: usize,
        align: Align,
        viewport_height: u32,
        scroll_offset: u64,
    ) -> u64 {
        let count = self.count();
        if count == 0 {
            return 0;
        }
        let Some(item) = self.item(index.min(count - 1)) else {
            return 0;
        };
        let view = viewport_height as u64;

        let target = match align {
            Align::Start => item.start,
            Align::End => item.end().saturating_sub(view),
            Align::Center => {
                let center = item.start.saturating_add(item.size as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur_end = scroll_offset.saturating_add(view);
                if item.start >= scroll_offset && item.end() <= cur_end {
                    scroll_offset
                } else if item.start < scroll_offset {
                    item.start
                } else {
                    item.end().saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target, viewport_height)
    }

    /// Drops every row and measurement.
    pub fn clear(&mut self) {
        self.heights.clear();
        self.offsets.clear();
    }

    #[cfg(test)]
    pub(crate) fn valid_offsets(&self) -> usize {
        self.offsets.valid()
    }
}
