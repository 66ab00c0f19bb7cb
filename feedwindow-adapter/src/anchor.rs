use alloc::string::{String, ToString};

use crate::SessionStore;

/// Storage key used by the activity feed.
pub const FEED_KEY: &str = "feed-scroll-position";
/// Storage key used by the comment thread.
pub const COMMENTS_KEY: &str = "comments-scroll-position";

/// Persists one scroll offset under a caller-supplied key.
///
/// Storage failures are swallowed: `save` becomes a no-op and `restore` returns `None`.
#[derive(Clone, Debug)]
pub struct ScrollAnchor<S> {
    store: S,
    key: String,
    restore_attempted: bool,
}

impl<S: SessionStore> ScrollAnchor<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            restore_attempted: false,
        }
    }

    pub fn feed(store: S) -> Self {
        Self::new(store, FEED_KEY)
    }

    pub fn comments(store: S) -> Self {
        Self::new(store, COMMENTS_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrites the stored offset. Best effort.
    pub fn save(&mut self, offset: u64) {
        if let Err(_err) = self.store.set(&self.key, offset.to_string()) {
            vwarn!(key = %self.key, err = %_err, "ScrollAnchor::save failed");
        }
    }

    /// Reads the stored offset. Missing, unparseable and unreadable values are all `None`.
    pub fn restore(&self) -> Option<u64> {
        match self.store.get(&self.key) {
            Ok(raw) => raw.as_deref().and_then(parse_offset),
            Err(_err) => {
                vwarn!(key = %self.key, err = %_err, "ScrollAnchor::restore failed");
                None
            }
        }
    }

    /// Performs the single restore attempt of this anchor's lifetime.
    ///
    /// Later calls return `None` without touching the store.
    pub fn take_restore(&mut self) -> Option<u64> {
        if self.restore_attempted {
            return None;
        }
        self.restore_attempted = true;
        let offset = self.restore();
        vdebug!(key = %self.key, ?offset, "ScrollAnchor::take_restore");
        offset
    }

    pub fn restore_attempted(&self) -> bool {
        self.restore_attempted
    }
}

/// Parses a stored offset. Fractional pixel values are truncated; negative and non-finite
/// values are rejected.
pub(crate) fn parse_offset(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0 && v < u64::MAX as f64).then_some(v as u64)
}

