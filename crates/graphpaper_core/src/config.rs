//! Per-file configuration.
//!
//! Configuration lives inside the graph file itself, in a `config` table of
//! string keys and string values. The presence of that table is what marks a
//! file as initialized.

use crate::connection::Connection;
use crate::error::{GpError, Result};
use crate::object_id::ObjectId;

/// Table holding the configuration.
pub const CONFIG_TABLE: &str = "config";

/// Format version of the file. Absent in files from before commits existed.
pub const VERSION_KEY: &str = "version";
/// Hex oid of the current commit.
pub const HEAD_KEY: &str = "head";
pub const VIEWPORT_X_KEY: &str = "viewport_x";
pub const VIEWPORT_Y_KEY: &str = "viewport_y";
pub const VIEWPORT_W_KEY: &str = "viewport_w";
pub const VIEWPORT_H_KEY: &str = "viewport_h";

/// The only format version this build reads and writes.
pub const CURRENT_VERSION: &str = "2";

/// Values written to a freshly initialized file.
///
/// `version` is not among them: it is written only once the file has a head,
/// so an interrupted initialization reads as an unversioned file.
pub const DEFAULTS: [(&str, &str); 4] = [
    (VIEWPORT_X_KEY, "0"),
    (VIEWPORT_Y_KEY, "0"),
    (VIEWPORT_W_KEY, "600"),
    (VIEWPORT_H_KEY, "400"),
];

/// The visible region of the canvas, as last saved by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            w: 600,
            h: 400,
        }
    }
}

/// Persisted, ordered string-to-string map.
///
/// Every `set` is written through immediately.
#[derive(Clone)]
pub struct ConfigMap {
    conn: Connection,
}

impl ConfigMap {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns true if the file has a configuration table at all.
    pub fn exists(&self) -> Result<bool> {
        self.conn.has_table(CONFIG_TABLE)
    }

    /// Creates the table and writes [`DEFAULTS`].
    pub fn init(&self) -> Result<()> {
        self.conn.create_table(CONFIG_TABLE)?;
        for (key, value) in DEFAULTS {
            self.set(key, value)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .get(CONFIG_TABLE, key)?
            .map(|bytes| decode_value(key, bytes))
            .transpose()
    }

    /// Inserts or replaces a value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.put(CONFIG_TABLE, key, value.as_bytes())
    }

    /// All entries in key order.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        self.conn
            .entries(CONFIG_TABLE)?
            .into_iter()
            .map(|(key, bytes)| {
                let value = decode_value(&key, bytes)?;
                Ok((key, value))
            })
            .collect()
    }

    pub fn version(&self) -> Result<Option<String>> {
        self.get(VERSION_KEY)
    }

    /// Reads the head pointer.
    ///
    /// # Errors
    ///
    /// `Corrupted` if the stored value isn't a valid oid.
    pub fn head(&self) -> Result<Option<ObjectId>> {
        match self.get(HEAD_KEY)? {
            Some(hex) => ObjectId::from_hex(&hex)
                .map(Some)
                .map_err(|e| GpError::Corrupted(format!("head pointer {:?}: {}", hex, e))),
            None => Ok(None),
        }
    }

    pub fn set_head(&self, oid: ObjectId) -> Result<()> {
        self.set(HEAD_KEY, &oid.as_hex())
    }

    /// Reads the viewport, falling back to the default for each missing or
    /// non-numeric component.
    pub fn viewport(&self) -> Result<Viewport> {
        let fallback = Viewport::default();
        let read = |key: &str, default: i64| -> Result<i64> {
            Ok(self
                .get(key)?
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default))
        };

        Ok(Viewport {
            x: read(VIEWPORT_X_KEY, fallback.x)?,
            y: read(VIEWPORT_Y_KEY, fallback.y)?,
            w: read(VIEWPORT_W_KEY, fallback.w)?,
            h: read(VIEWPORT_H_KEY, fallback.h)?,
        })
    }

    pub fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        self.set(VIEWPORT_X_KEY, &viewport.x.to_string())?;
        self.set(VIEWPORT_Y_KEY, &viewport.y.to_string())?;
        self.set(VIEWPORT_W_KEY, &viewport.w.to_string())?;
        self.set(VIEWPORT_H_KEY, &viewport.h.to_string())
    }
}

fn decode_value(key: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| GpError::Corrupted(format!("config value for {:?} is not UTF-8", key)))
}
