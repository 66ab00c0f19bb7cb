use alloc::vec::Vec;

use crate::heights::HeightCache;

/// Lazily maintained prefix sums over row heights.
///
/// `ends[i]` is the cumulative height of rows `0..=i`. Only `ends[..valid]` is trusted;
/// invalidation lowers the watermark and the next read recomputes forward from it, so a
/// re-layout costs time proportional to the rows that changed, not to the list size.
#[derive(Clone, Debug, Default)]
pub(crate) struct OffsetTable {
    ends: Vec<u64>,
    valid: usize,
}

impl OffsetTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn valid(&self) -> usize {
        self.valid
    }

    pub(crate) fn resize(&mut self, len: usize) {
        self.ends.resize(len, 0);
        self.valid = self.valid.min(len);
    }

    /// Marks `index` and everything after it as stale.
    pub(crate) fn invalidate_from(&mut self, index: usize) {
        self.valid = self.valid.min(index);
    }

    pub(crate) fn clear(&mut self) {
        self.ends.clear();
        self.valid = 0;
    }

    /// Makes `ends[..upto]` valid.
    fn extend_to(&mut self, upto: usize, heights: &HeightCache) {
        let upto = upto.min(self.ends.len());
        if upto <= self.valid {
            return;
        }
        let mut acc = self.end_before(self.valid);
        for i in self.valid..upto {
            acc = acc.saturating_add(heights.get(i) as u64);
            self.ends[i] = acc;
        }
        self.valid = upto;
    }

    fn end_before(&self, index: usize) -> u64 {
        if index == 0 { 0 } else { self.ends[index - 1] }
    }

    /// Start offset of row `index` (clamped to the table length).
    pub(crate) fn start_of(&mut self, index: usize, heights: &HeightCache) -> u64 {
        let index = index.min(self.ends.len());
        self.extend_to(index, heights);
        self.end_before(index)
    }

    pub(crate) fn end_of(&mut self, index: usize, heights: &HeightCache) -> u64 {
        self.start_of(index.saturating_add(1), heights)
    }

    pub(crate) fn total(&mut self, heights: &HeightCache) -> u64 {
        self.start_of(self.ends.len(), heights)
    }

    /// Returns the number of rows whose cumulative end is `<= target`, i.e. the index of the
    /// row containing `target` (or `len` when `target` is past the end).
    ///
    /// Binary-searches the valid prefix and only extends the table as far as the answer needs.
    pub(crate) fn lower_bound(&mut self, target: u64, heights: &HeightCache) -> usize {
        if self.valid > 0 && self.ends[self.valid - 1] > target {
            return self.ends[..self.valid].partition_point(|&end| end <= target);
        }
        let n = self.ends.len();
        let mut i = self.valid;
        while i < n {
            self.extend_to(i + 1, heights);
            if self.ends[i] > target {
                return i;
            }
            i += 1;
        }
        n
    }
}
