//! Typed records with change tracking.
//!
//! A [`Record`] pairs a set of typed fields with the address they were last
//! saved under. Any mutable access clears that address, so `oid().is_some()`
//! holds exactly when the fields match the bytes stored at the address.

use crate::canonical;
use crate::error::{GpError, Result};
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::ops::Deref;
use tracing::debug;

/// Keys of a stored mapping that the typed fields don't know about.
///
/// Flattened into every record type so loading and re-saving an object
/// written by a newer build keeps its extra keys.
pub type ExtraFields = std::collections::BTreeMap<String, Value>;

/// Typed fields plus the address they were last saved under.
///
/// # Examples
///
/// ```
/// use graphpaper_core::{Connection, ObjectStore, Record};
/// use std::collections::BTreeMap;
///
/// let store = ObjectStore::new(Connection::in_memory().unwrap());
///
/// let mut record = Record::new(BTreeMap::from([("k".to_string(), 1)]));
/// let oid = record.save(&store).unwrap();
/// assert_eq!(record.oid(), Some(oid));
///
/// record.fields_mut().insert("k".to_string(), 2);
/// assert_eq!(record.oid(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Record<T> {
    fields: T,
    oid: Option<ObjectId>,
}

impl<T> Record<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Wraps fields that have never been saved.
    pub fn new(fields: T) -> Self {
        Self { fields, oid: None }
    }

    /// Loads a record from the store.
    ///
    /// # Errors
    ///
    /// - `ObjectNotFound` if nothing is stored under `oid`.
    /// - `Format` if the bytes don't decode, or decode to something other than a mapping.
    /// - `InvalidObject` if the mapping doesn't fit `T` (missing or mistyped field).
    ///
    /// The record keeps `oid` only if re-encoding the loaded fields gives
    /// back the stored bytes; otherwise it loads dirty and the next save
    /// writes the canonical form.
    pub fn load(store: &ObjectStore, oid: ObjectId) -> Result<Self> {
        let (bytes, value) = load_mapping(store, oid)?;
        Self::from_mapping(oid, &bytes, value)
    }

    /// Loads a record whose `objtype` key must equal `objtype`.
    ///
    /// The `objtype` check runs before the field check, so a record of the
    /// wrong kind reports `WrongObjectType` rather than a missing field.
    pub fn load_kind(store: &ObjectStore, oid: ObjectId, objtype: &'static str) -> Result<Self> {
        let (bytes, value) = load_mapping(store, oid)?;

        match value.get("objtype") {
            Some(Value::String(found)) if found == objtype => {}
            Some(Value::String(found)) => {
                return Err(GpError::WrongObjectType {
                    oid: oid.as_hex(),
                    expected: objtype,
                    found: found.clone(),
                })
            }
            Some(other) => {
                return Err(GpError::InvalidObject {
                    oid: oid.as_hex(),
                    reason: format!("objtype must be a string, got {}", other),
                })
            }
            None => {
                return Err(GpError::InvalidObject {
                    oid: oid.as_hex(),
                    reason: "missing field `objtype`".to_string(),
                })
            }
        }

        Self::from_mapping(oid, &bytes, value)
    }

    fn from_mapping(oid: ObjectId, bytes: &[u8], value: Value) -> Result<Self> {
        let fields: T = serde_json::from_value(value).map_err(|e| GpError::InvalidObject {
            oid: oid.as_hex(),
            reason: e.to_string(),
        })?;

        let canonical = canonical::encode(&fields).is_ok_and(|encoded| encoded == bytes);
        if !canonical {
            debug!(oid = %oid.short(), "record is not stored canonically, loading it dirty");
        }

        debug!(oid = %oid.short(), "loaded record");
        Ok(Self {
            fields,
            oid: canonical.then_some(oid),
        })
    }

    /// Encodes the fields canonically, stores them, and remembers the address.
    pub fn save(&mut self, store: &ObjectStore) -> Result<ObjectId> {
        let bytes = canonical::encode(&self.fields)?;
        let oid = store.store(&bytes)?;
        self.oid = Some(oid);
        Ok(oid)
    }
}

fn load_mapping(store: &ObjectStore, oid: ObjectId) -> Result<(Vec<u8>, Value)> {
    let bytes = store.get(oid)?;
    let value = canonical::decode(&bytes)?;

    if !value.is_object() {
        return Err(GpError::Format(format!(
            "record {} must be a mapping",
            oid.as_hex()
        )));
    }

    Ok((bytes, value))
}

impl<T> Record<T> {
    /// Address of the last save or load, or `None` if modified since.
    pub fn oid(&self) -> Option<ObjectId> {
        self.oid
    }

    /// Returns true if the fields match what is stored under `oid()`.
    pub fn is_saved(&self) -> bool {
        self.oid.is_some()
    }

    /// Read access to the fields.
    pub fn fields(&self) -> &T {
        &self.fields
    }

    /// Write access to the fields. Always clears the address, even if
    /// nothing ends up changing.
    pub fn fields_mut(&mut self) -> &mut T {
        self.oid = None;
        &mut self.fields
    }

    /// Forgets the address without touching the fields.
    pub fn invalidate(&mut self) {
        self.oid = None;
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.fields
    }
}
