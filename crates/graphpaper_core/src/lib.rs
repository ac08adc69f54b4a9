//! GraphPaper Core Library
//!
//! Storage engine for a graph of cards (positioned text notes) and edges
//! between them, providing:
//! - Canonical encoding of records
//! - Content-addressed object storage with collision detection
//! - Immutable commits of the whole graph, linked by parent
//! - One-time migration of legacy card tables
//!
//! # Quick Start
//!
//! ```
//! use graphpaper_core::GraphFile;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = tmp.path().join("board.gp");
//!
//! let mut file = GraphFile::open(&path).unwrap();
//! let graph = file.graph_mut();
//! let idea = graph.new_card(0, 0, 120, 80);
//! let plan = graph.new_card(200, 0, 120, 80);
//! graph.card_mut(idea).unwrap().set_text("idea");
//! graph.card_mut(plan).unwrap().set_text("plan");
//! graph.new_edge(idea, plan).unwrap();
//! file.commit().unwrap();
//! drop(file);
//!
//! let file = GraphFile::open(&path).unwrap();
//! assert_eq!(file.graph().cards().count(), 2);
//! assert_eq!(file.graph().edges().count(), 1);
//! ```
//!
//! # Features
//!
//! ## Content-Addressed Storage
//!
//! Objects are filed under the BLAKE3 digest of their bytes and compressed
//! with zstd at rest:
//!
//! ```
//! use graphpaper_core::{Connection, ObjectStore};
//!
//! let store = ObjectStore::new(Connection::in_memory().unwrap());
//!
//! // Same content = same ID (deduplication)
//! let id1 = store.store(b"content").unwrap();
//! let id2 = store.store(b"content").unwrap();
//! assert_eq!(id1, id2);
//! ```
//!
//! ## Commits and History
//!
//! Every commit records the oids of all live cards and edges plus its parent:
//!
//! ```
//! use graphpaper_core::{history, Connection, Graph, ObjectStore};
//!
//! let store = ObjectStore::new(Connection::in_memory().unwrap());
//! let mut graph = Graph::new(store.clone(), None).unwrap();
//!
//! let first = graph.commit().unwrap();
//! let card = graph.new_card(0, 0, 50, 50);
//! let second = graph.commit().unwrap();
//!
//! graph.delete_card(card).unwrap();
//! let third = graph.commit().unwrap();
//!
//! let log = history(&store, Some(third), None).unwrap();
//! let oids: Vec<_> = log.iter().map(|c| c.oid).collect();
//! assert_eq!(oids, vec![third, second, first]);
//! assert_eq!(log[1].cards.len(), 1);
//! assert!(log[0].cards.is_empty());
//! ```

pub mod canonical;
mod card;
mod config;
mod connection;
mod edge;
mod error;
mod file;
mod graph;
mod history;
mod migrate;
mod object_id;
mod object_store;
mod record;
mod verify;

pub use card::{Card, CardFields, CardId, CARD_OBJTYPE, MIN_CARD_SIZE};
pub use config::{
    ConfigMap, Viewport, CONFIG_TABLE, CURRENT_VERSION, DEFAULTS, HEAD_KEY, VERSION_KEY,
    VIEWPORT_H_KEY, VIEWPORT_W_KEY, VIEWPORT_X_KEY, VIEWPORT_Y_KEY,
};
pub use connection::Connection;
pub use edge::{Edge, EdgeFields, EdgeId, Endpoint, EDGE_OBJTYPE};
pub use error::{GpError, Result};
pub use file::{GraphFile, OpenKind};
pub use graph::{CommitFields, Graph, COMMIT_OBJTYPE};
pub use history::{history, CommitInfo};
pub use migrate::{import_legacy, parse_legacy_card, LegacyCard, MigrationReport, LEGACY_TABLE};
pub use object_id::ObjectId;
pub use object_store::{ContentHasher, ObjectStore, StoreOptions, OBJECTS_TABLE};
pub use record::{ExtraFields, Record};
pub use verify::{verify, VerifyConfig, VerifyReport};
