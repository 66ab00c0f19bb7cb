use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::{GeometryUnavailable, RowKey, RowRange};

/// Measurement state of a materialized row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowState {
    /// Materialized, no successful geometry read yet.
    Unmeasured,
    Measured,
    /// The host reported a content-driven size change; the cached height is provisional.
    Stale,
}

/// Host-side resize observation, supplied by the rendering collaborator.
///
/// `observe` is called once when a row is materialized and `dispose` exactly once when it is
/// released. Size changes flow back into the engine through its measurement entry points.
pub trait RowObserver<Id> {
    fn observe(&mut self, index: usize, key: &RowKey<Id>);
    fn dispose(&mut self, index: usize, key: &RowKey<Id>);
}

/// Observer for hosts that measure rows without resize notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl<Id> RowObserver<Id> for NoopObserver {
    fn observe(&mut self, _index: usize, _key: &RowKey<Id>) {}
    fn dispose(&mut self, _index: usize, _key: &RowKey<Id>) {}
}

impl<Id, O: RowObserver<Id> + ?Sized> RowObserver<Id> for &mut O {
    fn observe(&mut self, index: usize, key: &RowKey<Id>) {
        (**self).observe(index, key);
    }

    fn dispose(&mut self, index: usize, key: &RowKey<Id>) {
        (**self).dispose(index, key);
    }
}

#[derive(Clone, Debug)]
struct Materialized<Id> {
    key: RowKey<Id>,
    state: RowState,
}

/// Tracks which rows are materialized and where each one is in its measurement cycle.
///
/// Every `observe` issued through [`RowLifecycle::materialize`] is matched by exactly one
/// `dispose`: when the row leaves the range, when its key changes, or on
/// [`RowLifecycle::dispose_all`].
#[derive(Clone, Debug)]
pub struct RowLifecycle<Id> {
    rows: BTreeMap<usize, Materialized<Id>>,
}

impl<Id> Default for RowLifecycle<Id> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<Id: PartialEq> RowLifecycle<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<RowState> {
        self.rows.get(&index).map(|row| row.state)
    }

    pub fn key(&self, index: usize) -> Option<&RowKey<Id>> {
        self.rows.get(&index).map(|row| &row.key)
    }

    /// Indexes of materialized rows, ascending.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    /// Rows waiting for a geometry read (unmeasured or stale), ascending.
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .filter(|(_, row)| row.state != RowState::Measured)
            .map(|(&index, _)| index)
    }

    /// Makes the materialized set equal to `range`.
    ///
    /// Rows outside `range` are disposed, rows entering it are observed, and a row whose key
    /// at the same index changed is disposed and observed again.
    pub fn materialize(
        &mut self,
        range: Option<RowRange>,
        mut key_of: impl FnMut(usize) -> RowKey<Id>,
        observer: &mut impl RowObserver<Id>,
    ) {
        let Some(range) = range else {
            self.dispose_all(observer);
            return;
        };

        let leaving: Vec<usize> = self
            .rows
            .keys()
            .copied()
            .filter(|&i| !range.contains(i))
            .collect();
        for index in leaving {
            if let Some(row) = self.rows.remove(&index) {
                observer.dispose(index, &row.key);
            }
        }

        for index in range.iter() {
            let key = key_of(index);
            match self.rows.get(&index) {
                Some(row) if row.key == key => continue,
                Some(_) => {
                    if let Some(old) = self.rows.remove(&index) {
                        observer.dispose(index, &old.key);
                    }
                }
                None => {}
            }
            observer.observe(index, &key);
            self.rows.insert(
                index,
                Materialized {
                    key,
                    state: RowState::Unmeasured,
                },
            );
        }
        vtrace!(
            start = range.start_index,
            end = range.end_index,
            rows = self.rows.len(),
            "RowLifecycle::materialize"
        );
    }

    /// Applies the result of a geometry read.
    ///
    /// Returns the height to write through to the cache. Reads for rows that are no longer
    /// materialized, and failed reads, return `None` and leave the row's state unchanged so
    /// it is measured again on the next pass.
    pub fn on_geometry(
        &mut self,
        index: usize,
        result: Result<u32, GeometryUnavailable>,
    ) -> Option<u32> {
        let row = self.rows.get_mut(&index)?;
        match result {
            Ok(height) if height > 0 => {
                row.state = RowState::Measured;
                Some(height)
            }
            Ok(_) | Err(GeometryUnavailable) => {
                vtrace!(index, "RowLifecycle::on_geometry: geometry unavailable");
                None
            }
        }
    }

    /// Marks a measured row as provisional after a content-driven size change.
    ///
    /// Returns `false` if the row is not materialized.
    pub fn mark_stale(&mut self, index: usize) -> bool {
        let Some(row) = self.rows.get_mut(&index) else {
            return false;
        };
        if row.state == RowState::Measured {
            row.state = RowState::Stale;
        }
        true
    }

    /// Releases observations of rows at or after `pivot` (their indexes now address other
    /// rows).
    pub fn dispose_from(&mut self, pivot: usize, observer: &mut impl RowObserver<Id>) {
        for (index, row) in self.rows.split_off(&pivot) {
            observer.dispose(index, &row.key);
        }
    }

    /// Releases every observation. Calling it again is a no-op.
    pub fn dispose_all(&mut self, observer: &mut impl RowObserver<Id>) {
        if self.rows.is_empty() {
            return;
        }
        vdebug!(rows = self.rows.len(), "RowLifecycle::dispose_all");
        for (index, row) in core::mem::take(&mut self.rows) {
            observer.dispose(index, &row.key);
        }
    }
}
