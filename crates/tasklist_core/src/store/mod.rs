//! Key-value persistence contracts.
//!
//! # Responsibility
//! - Define the string key/value contract task storage is built on.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - Values are opaque UTF-8 strings; encoding is owned by callers.
//! - `write_locked` gives one read-modify-write cycle exclusive write access.

use crate::db::{DbError, DbResult};

mod memory_kv;
mod sqlite_kv;

pub use memory_kv::MemoryKvStore;
pub use sqlite_kv::SqliteKvStore;

/// Storage key holding the JSON-encoded task collection.
pub const TASKS_KEY: &str = "tasks";

/// String key/value storage.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_item(&self, key: &str) -> DbResult<Option<String>>;
    /// Inserts or replaces the value for `key`.
    fn set_item(&self, key: &str, value: &str) -> DbResult<()>;
    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> DbResult<()>;
    /// Runs `f` while holding exclusive write access to the store.
    ///
    /// Writes made inside `f` are discarded when `f` returns an error.
    fn write_locked<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>;
}
