//! Error types for graphpaper_core operations.

use crate::card::CardId;
use crate::edge::{EdgeId, Endpoint};
use thiserror::Error;

/// Core error type for graphpaper_core operations.
#[derive(Error, Debug)]
pub enum GpError {
    /// A value could not be canonically encoded, or bytes could not be decoded.
    #[error("format error: {0}")]
    Format(String),

    /// Object with the given ID was not found in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Two different contents produced the same object ID.
    ///
    /// This indicates a broken hash function or a corrupted backing table and
    /// is never resolved automatically.
    #[error("hash collision at {oid}: stored content differs from new content")]
    Collision {
        /// The contested object ID
        oid: String,
    },

    /// The store refused a write because an earlier collision halted it.
    #[error("object store halted after a hash collision; refusing further writes")]
    StoreHalted,

    /// Stored bytes no longer hash to the key they are filed under.
    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        /// The expected object ID
        expected: String,
        /// The actual computed hash
        actual: String,
    },

    /// The backing database failed.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compression or decompression of a stored value failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// Invalid hex string for ObjectId parsing.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// A stored mapping does not fit the expected record schema.
    #[error("invalid object {oid}: {reason}")]
    InvalidObject {
        /// Object ID of the offending record
        oid: String,
        /// What is wrong with it (missing field, wrong field type, ...)
        reason: String,
    },

    /// A record carries an unexpected `objtype`.
    #[error("object {oid} has objtype {found:?}, expected {expected:?}")]
    WrongObjectType {
        /// Object ID of the offending record
        oid: String,
        /// The objtype the caller asked for
        expected: &'static str,
        /// The objtype actually stored
        found: String,
    },

    /// An edge names a card that is not part of the loaded graph.
    #[error("edge {edge}: {endpoint} card {card} could not be resolved")]
    UnresolvedEndpoint {
        /// Object ID of the edge
        edge: String,
        /// Which end failed
        endpoint: Endpoint,
        /// The card oid stored in the edge, or "null"
        card: String,
    },

    /// An edge was saved before one of its endpoint cards.
    #[error("{0} card has not been saved")]
    EndpointNotSaved(Endpoint),

    /// A card handle does not belong to the working set.
    #[error("unknown card: {0}")]
    UnknownCard(CardId),

    /// An edge handle does not belong to the working set.
    #[error("unknown edge: {0}")]
    UnknownEdge(EdgeId),

    /// A commit could not be loaded.
    #[error("invalid commit {oid}: {reason}")]
    InvalidCommit {
        /// Object ID of the commit
        oid: String,
        /// Why loading failed
        reason: String,
    },

    /// A legacy card record could not be parsed.
    #[error("invalid legacy card: {0}")]
    InvalidCard(String),

    /// The file claims to be current but lacks required state.
    #[error("corrupted file: {0}")]
    Corrupted(String),

    /// The file was written by a newer or unknown format version.
    #[error("unsupported file format version {found:?} (supported: {supported})")]
    UnsupportedVersion {
        /// Version marker found in the file
        found: String,
        /// Version this build understands
        supported: &'static str,
    },
}

impl GpError {
    /// Returns true for integrity violations that must stop all further writes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Collision { .. } | Self::StoreHalted | Self::HashMismatch { .. }
        )
    }

    /// Returns true for schema and referential failures of the graph model.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::InvalidObject { .. }
                | Self::WrongObjectType { .. }
                | Self::UnresolvedEndpoint { .. }
                | Self::EndpointNotSaved(_)
                | Self::UnknownCard(_)
                | Self::UnknownEdge(_)
                | Self::InvalidCommit { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Collision { .. } | Self::StoreHalted => Some(
                "Stop writing to this file and keep a backup; the object table may be corrupted.",
            ),
            Self::HashMismatch { .. } => {
                Some("Run 'gp verify' to list every corrupted object in the file.")
            }
            Self::ObjectNotFound(_) | Self::InvalidCommit { .. } => {
                Some("The file might be corrupted. Run 'gp verify' to check.")
            }
            Self::Corrupted(_) => {
                Some("The head pointer is missing. Restore the file from a backup.")
            }
            Self::UnsupportedVersion { .. } => {
                Some("This file was written by a newer version; upgrade before opening it.")
            }
            Self::InvalidCard(_) => {
                Some("Fix or remove the offending row in the legacy 'cards' table and reopen.")
            }
            _ => None,
        }
    }
}

/// Convenience Result type for graphpaper_core operations.
pub type Result<T> = std::result::Result<T, GpError>;

/// Maps any redb error type into [`GpError::Storage`].
pub(crate) fn storage<E: Into<redb::Error>>(err: E) -> GpError {
    GpError::Storage(err.into())
}
