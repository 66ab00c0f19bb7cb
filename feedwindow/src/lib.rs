//! A headless windowing engine for variable-height feeds and collapsible comment trees.
//!
//! For host-facing orchestration (scroll persistence, row observation, pagination wiring),
//! see the `feedwindow-adapter` crate.
//!
//! This crate holds the pure indexing and caching logic: per-row height estimates and
//! measurements, a lazily rebuilt prefix sum for offset ↔ index mapping, overscanned visible
//! ranges, tree flattening under an expand/collapse set, and the per-row measurement
//! lifecycle.
//!
//! It is UI-agnostic. A host is expected to provide:
//! - viewport height and scroll offset
//! - measured row heights (and notifications when a row's content changes size)
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod flatten;
mod heights;
mod key;
mod lifecycle;
mod offsets;
mod options;
mod pagination;
mod types;
mod windower;


pub use error::GeometryUnavailable;
pub use flatten::{ExpandSet, FlatRow, Keyed, TreeItem, first_divergence, flatten, flatten_items};
pub use heights::HeightCache;
pub use key::RowId;
pub use lifecycle::{NoopObserver, RowLifecycle, RowObserver, RowState};
pub use options::{COMMENT_ESTIMATED_SIZE, Estimate, FEED_ESTIMATED_SIZE, WindowOptions};
pub use pagination::{DEFAULT_THRESHOLD_ROWS, Paginator, should_load_more};
pub use types::{Align, RowGeometry, RowKey, RowRange};
pub use windower::Windower;
