//! Process-local key-value store.

use super::KeyValueStore;
use crate::db::{DbError, DbResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-memory store for tests and throwaway sessions.
///
/// Not shared across threads. `write_locked` restores a snapshot when the
/// closure fails.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one value.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.items.borrow_mut().insert(key.into(), value.into());
        store
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> DbResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn write_locked<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let snapshot = self.items.borrow().clone();
        let result = f(self);
        if result.is_err() {
            *self.items.borrow_mut() = snapshot;
        }
        result
    }
}
