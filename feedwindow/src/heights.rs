use alloc::vec::Vec;

use crate::Estimate;

/// Per-row height store.
///
/// Rows start out estimated (a pure function of the configured [`Estimate`] and the row's
/// depth). A measurement replaces the estimate; later measurements only replace it when they
/// drift by more than `drift_tolerance`.
#[derive(Clone, Debug)]
pub struct HeightCache {
    estimate: Estimate,
    drift_tolerance: u32,
    depths: Vec<usize>,
    measured: Vec<Option<u32>>,
}

impl HeightCache {
    pub fn new(estimate: Estimate, drift_tolerance: u32) -> Self {
        Self {
            estimate,
            drift_tolerance,
            depths: Vec::new(),
            measured: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn estimate(&self) -> Estimate {
        self.estimate
    }

    pub fn drift_tolerance(&self) -> u32 {
        self.drift_tolerance
    }

    pub fn depth_of(&self, index: usize) -> usize {
        self.depths.get(index).copied().unwrap_or(0)
    }

    /// Returns the cached height, or the estimate for unmeasured rows.
    ///
    /// Never fails and never returns 0; indexes past the end get the depth-0 estimate.
    pub fn get(&self, index: usize) -> u32 {
        match self.measured.get(index).copied().flatten() {
            Some(h) => h,
            None => self.estimate.size_at_depth(self.depth_of(index)),
        }
    }

    pub fn is_measured(&self, index: usize) -> bool {
        matches!(self.measured.get(index), Some(Some(_)))
    }

    pub fn measured_count(&self) -> usize {
        self.measured.iter().filter(|m| m.is_some()).count()
    }

    /// Records a measured height.
    ///
    /// Returns the height delta when the effective height of `index` changed; every offset at
    /// or after `index` is stale in that case. Zero heights and out-of-range indexes are
    /// ignored.
    pub fn set(&mut self, index: usize, height: u32) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        if height == 0 {
            vwarn!(index, "HeightCache::set: ignoring zero height");
            return None;
        }

        let cur = self.get(index);
        if let Some(prev) = self.measured[index] {
            if prev.abs_diff(height) <= self.drift_tolerance {
                return None;
            }
        }

        self.measured[index] = Some(height);
        let delta = height as i64 - cur as i64;
        vtrace!(index, height, delta, "HeightCache::set");
        (delta != 0).then_some(delta)
    }

    /// Drops measurements for every index `>= pivot`, returning how many were cleared.
    pub fn invalidate_from(&mut self, pivot: usize) -> usize {
        let mut cleared = 0usize;
        for slot in self.measured.iter_mut().skip(pivot) {
            if slot.take().is_some() {
                cleared += 1;
            }
        }
        vdebug!(pivot, cleared, "HeightCache::invalidate_from");
        cleared
    }

    /// Adopts the depths of a new row set.
    ///
    /// Measurements are kept by index; callers invalidate them explicitly when rows move.
    /// Returns the first index whose estimate may differ from before.
    pub fn set_depths(&mut self, depths: impl IntoIterator<Item = usize>) -> usize {
        let prev_len = self.depths.len();
        let mut first_changed = None;
        let mut n = 0usize;
        for depth in depths {
            if n < prev_len {
                if self.depths[n] != depth {
                    first_changed.get_or_insert(n);
                    self.depths[n] = depth;
                }
            } else {
                self.depths.push(depth);
            }
            n += 1;
        }
        self.depths.truncate(n);
        self.measured.resize(n, None);

        first_changed.unwrap_or(prev_len.min(n))
    }

    pub fn clear(&mut self) {
        self.depths.clear();
        self.measured.clear();
    }
}
