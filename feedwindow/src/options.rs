use crate::pagination::DEFAULT_THRESHOLD_ROWS;

/// Estimated row height used by [`WindowOptions::feed`].
pub const FEED_ESTIMATED_SIZE: u32 = 400;
/// Estimated row height used by [`WindowOptions::comments`].
pub const COMMENT_ESTIMATED_SIZE: u32 = 150;

/// Pure estimate for rows that have not been measured yet.
///
/// `size = base_size + min(depth * depth_step, max_depth_adjustment)`, never below 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Estimate {
    pub base_size: u32,
    pub depth_step: u32,
    pub max_depth_adjustment: u32,
}

impl Estimate {
    pub fn flat(base_size: u32) -> Self {
        Self {
            base_size,
            depth_step: 0,
            max_depth_adjustment: 0,
        }
    }

    pub fn size_at_depth(&self, depth: usize) -> u32 {
        let depth = u32::try_from(depth).unwrap_or(u32::MAX);
        let adjustment = depth
            .saturating_mul(self.depth_step)
            .min(self.max_depth_adjustment);
        self.base_size.saturating_add(adjustment).max(1)
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Self {
            base_size: COMMENT_ESTIMATED_SIZE,
            depth_step: 10,
            max_depth_adjustment: 50,
        }
    }
}

/// Configuration for [`crate::Windower`] and the adapter engine built on top of it.
///
/// Every tuning constant lives here; none of them are part of the engine's contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowOptions {
    pub estimate: Estimate,

    /// Minimum height delta before a re-measurement replaces a cached height.
    ///
    /// Keeps sub-pixel jitter from cascading offset invalidation.
    pub drift_tolerance: u32,

    /// Extra rows materialized beyond each viewport edge.
    pub overscan: usize,

    /// Deepest tree level that is emitted. Children of rows at this depth are omitted.
    pub max_depth: usize,

    /// Rows from the end of the data set at which pagination fires.
    pub load_more_threshold: usize,

    /// Whether a height change of a row that starts above the scroll offset shifts the scroll
    /// offset by the same delta, keeping the content under the viewport in place.
    pub adjust_scroll_on_resize: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::comments()
    }
}

impl WindowOptions {
    /// Creates options with a flat estimate of `base_size` for every row.
    pub fn new(base_size: u32) -> Self {
        Self {
            estimate: Estimate::flat(base_size),
            drift_tolerance: 5,
            overscan: 3,
            max_depth: 10,
            load_more_threshold: DEFAULT_THRESHOLD_ROWS,
            adjust_scroll_on_resize: true,
        }
    }

    /// Defaults for a flat activity feed.
    pub fn feed() -> Self {
        Self::new(FEED_ESTIMATED_SIZE)
    }

    /// Defaults for a nested comment tree: deeper replies are estimated slightly taller.
    pub fn comments() -> Self {
        Self {
            estimate: Estimate::default(),
            ..Self::new(COMMENT_ESTIMATED_SIZE)
        }
    }

    pub fn with_estimate(mut self, estimate: Estimate) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_base_size(mut self, base_size: u32) -> Self {
        self.estimate.base_size = base_size;
        self
    }

    pub fn with_depth_adjustment(mut self, depth_step: u32, max_depth_adjustment: u32) -> Self {
        self.estimate.depth_step = depth_step;
        self.estimate.max_depth_adjustment = max_depth_adjustment;
        self
    }

    pub fn with_drift_tolerance(mut self, drift_tolerance: u32) -> Self {
        self.drift_tolerance = drift_tolerance;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_load_more_threshold(mut self, threshold_rows: usize) -> Self {
        self.load_more_threshold = threshold_rows;
        self
    }

    pub fn with_adjust_scroll_on_resize(mut self, adjust: bool) -> Self {
        self.adjust_scroll_on_resize = adjust;
        self
    }
}
