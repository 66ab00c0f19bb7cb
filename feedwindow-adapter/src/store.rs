use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::StoreError;

#[cfg(feature = "std")]
type KeyMap = HashMap<String, String>;
#[cfg(not(feature = "std"))]
type KeyMap = BTreeMap<String, String>;

/// Session-scoped key/value persistence, injected by the host.
///
/// Values must outlive a single engine instance (e.g. browser session storage) so a
/// remounted list can restore its scroll position.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// An in-process store whose clones share one map.
///
/// Hand a clone to each engine instance; the values survive engine teardown for as long as
/// any clone is alive. The handle is deliberately `!Send`: the engine assumes a single
/// writer.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<KeyMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.borrow_mut().remove(key)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(String::from(key), value);
        Ok(())
    }
}
