//! Edges: directed connections between two cards.
//!
//! An edge stores the oids of its endpoint cards, but in memory it only holds
//! [`CardId`] handles into the owning graph's card table. Whether an edge is
//! dirty or deleted therefore depends on the cards it points at, and every
//! such query takes the card table as an argument.

use crate::card::{Card, CardId};
use crate::error::{GpError, Result};
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use crate::record::{ExtraFields, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `objtype` of stored edges.
pub const EDGE_OBJTYPE: &str = "edge";

/// Handle to an edge in a [`Graph`](crate::Graph) working set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// One end of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Orig,
    Dest,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Orig => f.write_str("origin"),
            Endpoint::Dest => f.write_str("dest"),
        }
    }
}

/// Stored fields of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFields {
    /// Always [`EDGE_OBJTYPE`].
    pub objtype: String,
    /// Oid of the origin card as of the last save.
    pub orig: Option<ObjectId>,
    /// Oid of the destination card as of the last save.
    pub dest: Option<ObjectId>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for EdgeFields {
    fn default() -> Self {
        Self {
            objtype: EDGE_OBJTYPE.to_string(),
            orig: None,
            dest: None,
            extra: ExtraFields::new(),
        }
    }
}

/// A directed edge between two cards of the same graph.
#[derive(Debug, Clone)]
pub struct Edge {
    record: Record<EdgeFields>,
    orig: CardId,
    dest: CardId,
    deleted: bool,
}

impl Edge {
    /// Creates an unsaved edge. The stored endpoint oids stay null until the
    /// first save.
    pub fn new(orig: CardId, dest: CardId) -> Self {
        Self {
            record: Record::new(EdgeFields::default()),
            orig,
            dest,
            deleted: false,
        }
    }

    /// Loads an edge, mapping each stored endpoint oid to a card handle with
    /// `resolve`.
    ///
    /// # Errors
    ///
    /// `WrongObjectType` if the object isn't an edge, `UnresolvedEndpoint` if
    /// an endpoint is null or `resolve` doesn't know it.
    pub fn load(
        store: &ObjectStore,
        oid: ObjectId,
        resolve: impl Fn(ObjectId) -> Option<CardId>,
    ) -> Result<Self> {
        let record: Record<EdgeFields> = Record::load_kind(store, oid, EDGE_OBJTYPE)?;

        let lookup = |endpoint: Endpoint, card: Option<ObjectId>| {
            card.and_then(&resolve)
                .ok_or_else(|| GpError::UnresolvedEndpoint {
                    edge: oid.as_hex(),
                    endpoint,
                    card: card.map_or_else(|| "null".to_string(), |c| c.as_hex()),
                })
        };
        let orig = lookup(Endpoint::Orig, record.orig)?;
        let dest = lookup(Endpoint::Dest, record.dest)?;

        Ok(Self {
            record,
            orig,
            dest,
            deleted: false,
        })
    }

    pub fn orig(&self) -> CardId {
        self.orig
    }

    pub fn dest(&self) -> CardId {
        self.dest
    }

    /// The stored fields, including the endpoint oids of the last save.
    pub fn fields(&self) -> &EdgeFields {
        self.record.fields()
    }

    /// Address of the last save or load, or `None` if changed since.
    pub fn oid(&self) -> Option<ObjectId> {
        self.record.oid()
    }

    /// Returns true if the edge has to be re-saved: its own oid is unset, or
    /// an endpoint card is dirty or gone.
    pub fn is_dirty(&self, cards: &BTreeMap<CardId, Card>) -> bool {
        let endpoint_dirty = |id: CardId| cards.get(&id).map_or(true, Card::is_dirty);
        !self.record.is_saved() || endpoint_dirty(self.orig) || endpoint_dirty(self.dest)
    }

    /// Returns true if the edge or either endpoint card is marked deleted.
    pub fn is_deleted(&self, cards: &BTreeMap<CardId, Card>) -> bool {
        let endpoint_deleted = |id: CardId| cards.get(&id).is_some_and(Card::is_deleted);
        self.deleted || endpoint_deleted(self.orig) || endpoint_deleted(self.dest)
    }

    /// Returns the edge's own deletion flag, ignoring its endpoints.
    pub fn is_marked_deleted(&self) -> bool {
        self.deleted
    }

    /// Saves the edge if it is dirty and returns its oid.
    ///
    /// # Errors
    ///
    /// `EndpointNotSaved` if either endpoint card is missing or unsaved. Nothing
    /// is written in that case.
    pub fn save(&mut self, store: &ObjectStore, cards: &BTreeMap<CardId, Card>) -> Result<ObjectId> {
        if let (false, Some(oid)) = (self.is_dirty(cards), self.record.oid()) {
            return Ok(oid);
        }

        let saved_oid = |endpoint: Endpoint, id: CardId| {
            cards
                .get(&id)
                .and_then(Card::oid)
                .ok_or(GpError::EndpointNotSaved(endpoint))
        };
        let orig = saved_oid(Endpoint::Orig, self.orig)?;
        let dest = saved_oid(Endpoint::Dest, self.dest)?;

        let fields = self.record.fields_mut();
        fields.orig = Some(orig);
        fields.dest = Some(dest);
        self.record.save(store)
    }

    /// Clears the edge's oid so the next save rewrites it.
    pub fn invalidate(&mut self) {
        self.record.invalidate();
    }

    /// Marks the edge for removal on the next commit. Idempotent.
    pub fn delete(&mut self) {
        self.deleted = true;
    }

    /// Points the edge at a different origin card. The graph checks that the
    /// card exists, see [`Graph::set_edge_orig`](crate::Graph::set_edge_orig).
    pub(crate) fn set_orig(&mut self, card: CardId) {
        self.orig = card;
        self.record.fields_mut().orig = None;
    }

    /// Points the edge at a different destination card.
    pub(crate) fn set_dest(&mut self, card: CardId) {
        self.dest = card;
        self.record.fields_mut().dest = None;
    }
}
