//! Host-facing orchestration for the `feedwindow` crate.
//!
//! The `feedwindow` crate is UI-agnostic and focuses on layout math and row bookkeeping. This
//! crate wires those pieces into a single [`Engine`] per list and adds the collaborators a
//! host needs:
//!
//! - Scroll persistence across remounts ([`ScrollAnchor`] over an injected [`SessionStore`])
//! - Row observation scoped to the materialized range (`feedwindow::RowObserver`)
//! - Pagination polling (`feedwindow::Paginator`)
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod engine;
mod error;
mod store;

#[cfg(test)]
mod tests;

pub use anchor::{COMMENTS_KEY, FEED_KEY, ScrollAnchor};
pub use engine::Engine;
pub use error::StoreError;
pub use store::{MemoryStore, SessionStore};
