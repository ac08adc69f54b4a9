//! Backing key/value tables on top of redb.
//!
//! A graph file is one redb database holding a handful of named tables, all
//! keyed by string with byte-string values. Every `put` runs in its own write
//! transaction and is durable once it returns.

use crate::error::{storage, Result};
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::Path;
use std::sync::Arc;

fn table_def(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// Cloneable handle to an open graph database.
///
/// Clones share the same underlying [`Database`].
#[derive(Clone)]
pub struct Connection {
    db: Arc<Database>,
}

impl Connection {
    /// Opens the database at `path`, creating it if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path.as_ref()).map_err(storage)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Opens a fresh database that lives only in memory.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(storage)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Reads one value. Missing tables read as empty.
    pub fn get(&self, table_name: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = match read_txn.open_table(table_def(table_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(storage(e)),
        };

        let value = table.get(key).map_err(storage)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    /// Inserts or replaces one value, creating the table if needed.
    pub fn put(&self, table_name: &str, key: &str, value: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(table_def(table_name)).map_err(storage)?;
            table.insert(key, value).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    /// Returns every `(key, value)` pair in key order. Missing tables read as empty.
    pub fn entries(&self, table_name: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = match read_txn.open_table(table_def(table_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(storage(e)),
        };

        let mut out = Vec::new();
        for entry in table.iter().map_err(storage)? {
            let (key, value) = entry.map_err(storage)?;
            out.push((key.value().to_string(), value.value().to_vec()));
        }
        Ok(out)
    }

    /// Returns true if a table with this name exists.
    pub fn has_table(&self, table_name: &str) -> Result<bool> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        match read_txn.open_table(table_def(table_name)) {
            Ok(_) => Ok(true),
            Err(TableError::TableDoesNotExist(_)) => Ok(false),
            Err(e) => Err(storage(e)),
        }
    }

    /// Creates an empty table if it doesn't exist yet.
    pub fn create_table(&self, table_name: &str) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        write_txn.open_table(table_def(table_name)).map_err(storage)?;
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    /// Drops a table and all its contents. Returns false if it didn't exist.
    pub fn drop_table(&self, table_name: &str) -> Result<bool> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        let existed = write_txn.delete_table(table_def(table_name)).map_err(storage)?;
        write_txn.commit().map_err(storage)?;
        Ok(existed)
    }
}
