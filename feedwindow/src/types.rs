/// An inclusive range of row indexes (`start_index..=end_index`).
///
/// Ranges returned by queries are never empty: an empty list yields `None` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    pub start_index: usize,
    pub end_index: usize, // inclusive
}

impl RowRange {
    /// Number of rows in the range. A hand-built range with `end_index < start_index` is
    /// empty, matching [`RowRange::iter`].
    pub fn len(&self) -> usize {
        if self.end_index < self.start_index {
            0
        } else {
            self.end_index - self.start_index + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end_index < self.start_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }

    pub fn iter(&self) -> core::ops::RangeInclusive<usize> {
        self.start_index..=self.end_index
    }

    /// Widens the range by `overscan` rows on both sides, clamped to `count`.
    pub fn expand(self, overscan: usize, count: usize) -> Self {
        let last = count.saturating_sub(1);
        Self {
            start_index: self.start_index.saturating_sub(overscan),
            end_index: self.end_index.saturating_add(overscan).min(last),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

/// Geometry handed to the rendering collaborator for one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowGeometry {
    pub index: usize,
    /// Start offset in the scroll axis.
    pub start: u64,
    /// Assigned height (measured, or the estimate until measured).
    pub size: u32,
}

impl RowGeometry {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// Identity of a flattened row.
///
/// Items that carry no identifier get a positional key so rendering never aborts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowKey<Id> {
    Id(Id),
    Position(usize),
}

impl<Id> RowKey<Id> {
    pub fn id(&self) -> Option<&Id> {
        match self {
            Self::Id(id) => Some(id),
            Self::Position(_) => None,
        }
    }
}
