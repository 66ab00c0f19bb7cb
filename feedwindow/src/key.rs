#[cfg(not(feature = "std"))]
use alloc::collections::BTreeSet;
#[cfg(feature = "std")]
use std::collections::HashSet;

#[cfg(feature = "std")]
pub(crate) type IdSet<Id> = HashSet<Id>;
#[cfg(not(feature = "std"))]
pub(crate) type IdSet<Id> = BTreeSet<Id>;

/// Bounds required of item identifiers.
///
/// With `std` identifiers are hashed; without it they are ordered.
#[cfg(feature = "std")]
pub trait RowId: core::hash::Hash + Eq + Clone + core::fmt::Debug {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone + core::fmt::Debug> RowId for K {}

#[cfg(not(feature = "std"))]
pub trait RowId: Ord + Clone + core::fmt::Debug {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone + core::fmt::Debug> RowId for K {}
