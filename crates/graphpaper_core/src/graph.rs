//! The graph working set and commits.
//!
//! A [`Graph`] holds every card and edge of one snapshot plus the commit it
//! was loaded from. Cards and edges are addressed by stable handles
//! ([`CardId`], [`EdgeId`]) that are assigned in load/creation order and never
//! reused. Edges refer to cards by handle, so the graph drives a two-phase
//! save on commit: all cards first, then all edges.

use crate::card::{Card, CardId};
use crate::edge::{Edge, EdgeId};
use crate::error::{GpError, Result};
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use crate::record::{ExtraFields, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// `objtype` of stored commits.
pub const COMMIT_OBJTYPE: &str = "commit";

/// Stored fields of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFields {
    /// Always [`COMMIT_OBJTYPE`].
    pub objtype: String,
    /// The previous commit, `None` for the first one.
    pub parent: Option<ObjectId>,
    /// Card oids in working-set order.
    pub cards: Vec<ObjectId>,
    /// Edge oids in working-set order. Absent in commits written before
    /// edges existed.
    #[serde(default)]
    pub edges: Vec<ObjectId>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl CommitFields {
    fn new(parent: Option<ObjectId>, cards: Vec<ObjectId>, edges: Vec<ObjectId>) -> Self {
        Self {
            objtype: COMMIT_OBJTYPE.to_string(),
            parent,
            cards,
            edges,
            extra: ExtraFields::new(),
        }
    }
}

/// Loads a commit record, reporting any non-fatal failure as `InvalidCommit`.
pub(crate) fn load_commit(store: &ObjectStore, oid: ObjectId) -> Result<Record<CommitFields>> {
    Record::load_kind(store, oid, COMMIT_OBJTYPE).map_err(|e| match e {
        GpError::Storage(_) | GpError::Io(_) => e,
        e if e.is_fatal() => e,
        e => GpError::InvalidCommit {
            oid: oid.as_hex(),
            reason: e.to_string(),
        },
    })
}

/// The working set of cards and edges.
///
/// # Examples
///
/// ```
/// use graphpaper_core::{Connection, Graph, ObjectStore};
///
/// let store = ObjectStore::new(Connection::in_memory().unwrap());
/// let mut graph = Graph::new(store.clone(), None).unwrap();
///
/// let a = graph.new_card(0, 0, 100, 50);
/// let b = graph.new_card(200, 0, 100, 50);
/// graph.new_edge(a, b).unwrap();
/// let head = graph.commit().unwrap();
///
/// let reloaded = Graph::new(store, Some(head)).unwrap();
/// assert_eq!(reloaded.cards().count(), 2);
/// assert_eq!(reloaded.edges().count(), 1);
/// ```
pub struct Graph {
    store: ObjectStore,
    head: Option<ObjectId>,
    commit: Record<CommitFields>,
    cards: BTreeMap<CardId, Card>,
    edges: BTreeMap<EdgeId, Edge>,
    next_id: u64,
}

impl Graph {
    /// Opens a working set.
    ///
    /// With `None` the graph starts empty with no parent. With `Some(head)`
    /// the commit is loaded, then its cards, then its edges resolved against
    /// the loaded cards. When two cards of a commit share an oid, edges bind
    /// to the first of them.
    ///
    /// # Errors
    ///
    /// `InvalidCommit` if the commit is missing or malformed. Card and edge
    /// load errors are returned as they are.
    pub fn new(store: ObjectStore, head: Option<ObjectId>) -> Result<Self> {
        let mut graph = Self {
            head: None,
            commit: Record::new(CommitFields::new(None, Vec::new(), Vec::new())),
            store,
            cards: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_id: 0,
        };

        let Some(head) = head else {
            return Ok(graph);
        };

        let commit = load_commit(&graph.store, head)?;

        let mut by_oid: HashMap<ObjectId, CardId> = HashMap::new();
        for &oid in &commit.cards {
            let card = Card::load(&graph.store, oid)?;
            let id = CardId(graph.allocate());
            by_oid.entry(oid).or_insert(id);
            graph.cards.insert(id, card);
        }

        for &oid in &commit.edges {
            let edge = Edge::load(&graph.store, oid, |card| by_oid.get(&card).copied())?;
            let id = EdgeId(graph.allocate());
            graph.edges.insert(id, edge);
        }

        info!(
            head = %head.short(),
            cards = graph.cards.len(),
            edges = graph.edges.len(),
            "loaded graph"
        );
        graph.head = Some(head);
        graph.commit = commit;
        Ok(graph)
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Oid of the commit this working set was loaded from or last committed.
    pub fn head(&self) -> Option<ObjectId> {
        self.head
    }

    /// Parent of the current commit.
    pub fn parent(&self) -> Option<ObjectId> {
        self.commit.parent
    }

    /// The store this graph reads from and writes to.
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// All cards, including ones marked deleted but not yet committed.
    pub fn cards(&self) -> impl Iterator<Item = (CardId, &Card)> {
        self.cards.iter().map(|(id, card)| (*id, card))
    }

    /// The card behind `id`, deleted or not.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Mutable access to a card; any change marks it dirty.
    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(&id)
    }

    /// All edges, including ones marked deleted but not yet committed.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(id, edge)| (*id, edge))
    }

    /// The edge behind `id`, deleted or not.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Mutable access to an edge. Endpoints are changed through
    /// [`set_edge_orig`](Self::set_edge_orig) and
    /// [`set_edge_dest`](Self::set_edge_dest).
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    /// Edges that start or end at `card`.
    pub fn edges_of(&self, card: CardId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges()
            .filter(move |(_, edge)| edge.orig() == card || edge.dest() == card)
    }

    /// Adds a card. Sizes below the minimum are raised to it.
    pub fn new_card(&mut self, x: i64, y: i64, w: i64, h: i64) -> CardId {
        let mut card = Card::new();
        card.set_pos(x, y);
        card.set_size(w, h);

        let id = CardId(self.allocate());
        self.cards.insert(id, card);
        id
    }

    /// Adds an edge between two cards of this graph.
    pub fn new_edge(&mut self, orig: CardId, dest: CardId) -> Result<EdgeId> {
        for card in [orig, dest] {
            if !self.cards.contains_key(&card) {
                return Err(GpError::UnknownCard(card));
            }
        }

        let id = EdgeId(self.allocate());
        self.edges.insert(id, Edge::new(orig, dest));
        Ok(id)
    }

    /// Points an edge at a different origin card of this graph.
    pub fn set_edge_orig(&mut self, id: EdgeId, card: CardId) -> Result<()> {
        self.edge_for_endpoint(id, card)?.set_orig(card);
        Ok(())
    }

    /// Points an edge at a different destination card of this graph.
    pub fn set_edge_dest(&mut self, id: EdgeId, card: CardId) -> Result<()> {
        self.edge_for_endpoint(id, card)?.set_dest(card);
        Ok(())
    }

    fn edge_for_endpoint(&mut self, id: EdgeId, card: CardId) -> Result<&mut Edge> {
        if !self.cards.contains_key(&card) {
            return Err(GpError::UnknownCard(card));
        }
        self.edges.get_mut(&id).ok_or(GpError::UnknownEdge(id))
    }

    /// Marks a card, and with it every edge touching it, for removal.
    pub fn delete_card(&mut self, id: CardId) -> Result<()> {
        self.cards
            .get_mut(&id)
            .ok_or(GpError::UnknownCard(id))?
            .delete();
        Ok(())
    }

    /// Marks an edge for removal.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<()> {
        self.edges
            .get_mut(&id)
            .ok_or(GpError::UnknownEdge(id))?
            .delete();
        Ok(())
    }

    /// Whether the edge needs saving, taking its endpoint cards into account.
    pub fn edge_is_dirty(&self, id: EdgeId) -> Result<bool> {
        let edge = self.edges.get(&id).ok_or(GpError::UnknownEdge(id))?;
        Ok(edge.is_dirty(&self.cards))
    }

    /// Whether the edge or either of its endpoint cards is marked deleted.
    pub fn edge_is_deleted(&self, id: EdgeId) -> Result<bool> {
        let edge = self.edges.get(&id).ok_or(GpError::UnknownEdge(id))?;
        Ok(edge.is_deleted(&self.cards))
    }

    /// Saves every changed card and edge and records a new commit.
    ///
    /// Edges whose endpoints changed are invalidated first, since saving
    /// the cards clears the dirtiness they derive it from. Cards are saved
    /// before edges. Deleted cards and edges are dropped from the working set
    /// and the head moves only once every save succeeded; after a failure
    /// the working set still holds its pending changes and `commit` can be
    /// retried.
    pub fn commit(&mut self) -> Result<ObjectId> {
        for edge in self.edges.values_mut() {
            if edge.is_dirty(&self.cards) {
                edge.invalidate();
            }
        }

        let mut card_oids = Vec::new();
        for card in self.cards.values_mut().filter(|card| !card.is_deleted()) {
            let oid = match card.oid() {
                Some(oid) => oid,
                None => card.save(&self.store)?,
            };
            card_oids.push(oid);
        }

        let mut edge_oids = Vec::new();
        for edge in self.edges.values_mut() {
            if edge.is_deleted(&self.cards) {
                continue;
            }
            edge_oids.push(edge.save(&self.store, &self.cards)?);
        }

        let mut commit = Record::new(CommitFields::new(self.head(), card_oids, edge_oids));
        let oid = commit.save(&self.store)?;

        let cards = &self.cards;
        let edges_before = self.edges.len();
        self.edges.retain(|_, edge| !edge.is_deleted(cards));
        let cards_before = self.cards.len();
        self.cards.retain(|_, card| !card.is_deleted());
        debug!(
            cards_dropped = cards_before - self.cards.len(),
            edges_dropped = edges_before - self.edges.len(),
            "dropped deleted items"
        );

        info!(
            commit = %oid.short(),
            cards = self.cards.len(),
            edges = self.edges.len(),
            "committed graph"
        );
        self.head = Some(oid);
        self.commit = commit;
        Ok(oid)
    }
}
