//! Content-addressed object storage with collision detection.

use crate::connection::Connection;
use crate::error::{GpError, Result};
use crate::object_id::ObjectId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Table holding the current generation of objects.
pub const OBJECTS_TABLE: &str = "objects_v2";

/// Computes the address of a byte string.
///
/// Implemented for any `Fn(&[u8]) -> ObjectId`, so tests can swap in a
/// degenerate hash to provoke collisions.
pub trait ContentHasher: Send + Sync {
    /// Returns the address of `data`.
    fn hash(&self, data: &[u8]) -> ObjectId;
}

impl<F> ContentHasher for F
where
    F: Fn(&[u8]) -> ObjectId + Send + Sync,
{
    fn hash(&self, data: &[u8]) -> ObjectId {
        self(data)
    }
}

/// Tunables for an [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Zstd compression level for values at rest (1-22, default: 3).
    pub compression_level: i32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            compression_level: 3,
        }
    }
}

/// Content-addressed object storage.
///
/// Values are filed under the hex digest of their bytes and compressed with
/// zstd at rest. Storing is idempotent; storing different bytes under an
/// existing address is a [`GpError::Collision`] and halts the store for good.
/// Clones share the backing table and the halted state.
///
/// # Examples
///
/// ```
/// use graphpaper_core::{Connection, ObjectStore};
///
/// let store = ObjectStore::new(Connection::in_memory().unwrap());
///
/// let id = store.store(b"hello world").unwrap();
/// assert_eq!(store.get(id).unwrap(), b"hello world");
///
/// // Same content = same ID
/// assert_eq!(store.store(b"hello world").unwrap(), id);
/// ```
#[derive(Clone)]
pub struct ObjectStore {
    conn: Connection,
    table: String,
    hasher: Arc<dyn ContentHasher>,
    options: StoreOptions,
    halted: Arc<AtomicBool>,
}

impl ObjectStore {
    /// Creates a store over the default objects table, addressed by BLAKE3.
    pub fn new(conn: Connection) -> Self {
        Self::with_table(conn, OBJECTS_TABLE)
    }

    /// Creates a store over a named table.
    pub fn with_table(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
            hasher: Arc::new(ObjectId::hash),
            options: StoreOptions::default(),
            halted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the hash function.
    pub fn with_hasher(mut self, hasher: impl ContentHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Replaces the store options.
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the backing connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns true once a collision has been detected.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Retrieves bytes by their address.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if nothing is stored under `oid`.
    /// Returns `HashMismatch` if the stored bytes no longer hash to `oid`.
    pub fn get(&self, oid: ObjectId) -> Result<Vec<u8>> {
        let data = self
            .read_raw(oid)?
            .ok_or_else(|| GpError::ObjectNotFound(oid.as_hex()))?;

        let actual = self.hasher.hash(&data);
        if actual != oid {
            return Err(GpError::HashMismatch {
                expected: oid.as_hex(),
                actual: actual.as_hex(),
            });
        }

        Ok(data)
    }

    /// Stores bytes and returns their address.
    ///
    /// If identical bytes are already stored this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Collision` if different bytes are already stored under the
    /// same address, and `StoreHalted` on every call after that.
    pub fn store(&self, data: &[u8]) -> Result<ObjectId> {
        if self.is_halted() {
            return Err(GpError::StoreHalted);
        }

        let oid = self.hasher.hash(data);

        if let Some(existing) = self.read_raw(oid)? {
            if existing == data {
                debug!(oid = %oid.short(), "object already stored");
                return Ok(oid);
            }
            self.halted.store(true, Ordering::SeqCst);
            error!(
                oid = %oid,
                stored_len = existing.len(),
                new_len = data.len(),
                "hash collision, halting object store"
            );
            return Err(GpError::Collision { oid: oid.as_hex() });
        }

        let compressed = zstd::encode_all(data, self.options.compression_level)
            .map_err(|e| GpError::Compression(e.to_string()))?;
        self.conn.put(&self.table, &oid.as_hex(), &compressed)?;
        debug!(oid = %oid.short(), len = data.len(), "stored object");

        Ok(oid)
    }

    /// Checks if an object exists in the store.
    pub fn exists(&self, oid: ObjectId) -> Result<bool> {
        Ok(self.conn.get(&self.table, &oid.as_hex())?.is_some())
    }

    /// Lists every stored address without reading the values.
    pub fn ids(&self) -> Result<Vec<ObjectId>> {
        self.conn
            .entries(&self.table)?
            .into_iter()
            .map(|(key, _)| parse_key(&key))
            .collect()
    }

    /// Lists every stored object with its bytes, in address order.
    ///
    /// Used for diagnostics and verification.
    pub fn list_all(&self) -> Result<Vec<(ObjectId, Vec<u8>)>> {
        let mut objects = Vec::new();
        for (key, compressed) in self.conn.entries(&self.table)? {
            objects.push((parse_key(&key)?, decompress(&compressed)?));
        }
        Ok(objects)
    }

    /// Reads and decompresses a stored value without verifying it.
    fn read_raw(&self, oid: ObjectId) -> Result<Option<Vec<u8>>> {
        match self.conn.get(&self.table, &oid.as_hex())? {
            Some(compressed) => decompress(&compressed).map(Some),
            None => Ok(None),
        }
    }
}

fn parse_key(key: &str) -> Result<ObjectId> {
    ObjectId::from_hex(key)
        .map_err(|e| GpError::Corrupted(format!("bad object key {:?}: {}", key, e)))
}

fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(compressed).map_err(|e| GpError::Compression(e.to_string()))
}
