//! SQLite-backed key-value store over the `kv_store` table.

use super::KeyValueStore;
use crate::db::{DbError, DbResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store borrowing a migrated SQLite connection.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> DbResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn write_locked<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        // Already inside a caller-owned transaction: the caller commits.
        if !self.conn.is_autocommit() {
            return f(self);
        }

        self.conn
            .execute_batch("BEGIN IMMEDIATE;")
            .map_err(DbError::from)?;

        match f(self) {
            Ok(value) => {
                if let Err(err) = self.conn.execute_batch("COMMIT;") {
                    rollback(self.conn);
                    return Err(DbError::from(err).into());
                }
                Ok(value)
            }
            Err(err) => {
                rollback(self.conn);
                Err(err)
            }
        }
    }
}

fn rollback(conn: &Connection) {
    if let Err(err) = conn.execute_batch("ROLLBACK;") {
        warn!("event=kv_rollback module=store status=error error={err}");
    }
}
