//! This module provides a key/value store that keeps all entries in process memory.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::core::{KvStore, Result};

/// An in-memory [`KvStore`] backed by an ordered map.
///
/// Clones share the same entries, the way every page of a browser origin
/// shares one local storage: a second [`Vfs`](crate::Vfs) opened on a clone
/// sees everything the first one persisted.
///
/// ### Example
///
/// ```
/// use kv_vfs::{KvStore, MapStore};
///
/// let mut store = MapStore::new();
/// let view = store.clone();
///
/// store.set("fsjs./a.txt", "hello").unwrap();
/// assert_eq!(view.get("fsjs./a.txt").unwrap().as_deref(), Some("hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, across every namespace.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MapStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .borrow()
            .range(prefix.to_string()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
