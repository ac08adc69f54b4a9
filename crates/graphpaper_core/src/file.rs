//! Opening graph files.
//!
//! A [`GraphFile`] inspects the configuration of a freshly opened database
//! and decides between three paths:
//!
//! - no `config` table: a fresh file, so write the default configuration and
//!   an empty first commit;
//! - a `config` table without `version`: a legacy file, so import its cards,
//!   commit, stamp the version and drop the legacy table;
//! - `version = "2"`: load the commit named by `head`.

use crate::config::{ConfigMap, CURRENT_VERSION, VERSION_KEY};
use crate::connection::Connection;
use crate::error::{GpError, Result};
use crate::graph::Graph;
use crate::history::{history, CommitInfo};
use crate::migrate::{import_legacy, MigrationReport, LEGACY_TABLE};
use crate::object_id::ObjectId;
use crate::object_store::{ObjectStore, StoreOptions};
use crate::verify::{verify, VerifyConfig, VerifyReport};
use std::path::Path;
use tracing::info;

/// How a file was brought into its current state when opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenKind {
    /// The file was empty and has been initialized.
    Fresh,
    /// The file held legacy cards and has been converted.
    Migrated(MigrationReport),
    /// The file was already current and its head was loaded.
    Loaded,
}

/// An open graph file: configuration, object store and working set.
///
/// # Examples
///
/// ```
/// use graphpaper_core::GraphFile;
///
/// let mut file = GraphFile::open_in_memory().unwrap();
/// let card = file.graph_mut().new_card(10, 10, 120, 80);
/// file.graph_mut().card_mut(card).unwrap().set_text("hello");
/// let head = file.commit().unwrap();
///
/// assert_eq!(file.head(), Some(head));
/// assert_eq!(file.config().head().unwrap(), Some(head));
/// ```
pub struct GraphFile {
    conn: Connection,
    config: ConfigMap,
    graph: Graph,
    opened: OpenKind,
}

impl GraphFile {
    /// Opens the file at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Opens the file at `path` with custom store options.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening graph file");
        Self::from_connection_with(Connection::open(path)?, options)
    }

    /// Opens a scratch file that lives only in memory.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        Self::from_connection_with(conn, StoreOptions::default())
    }

    /// Decides between initializing, migrating and loading.
    ///
    /// # Errors
    ///
    /// - `Corrupted` if the file is current but has no head pointer.
    /// - `UnsupportedVersion` for any version other than the current one.
    /// - `InvalidCard` if a legacy row can't be parsed; the file is left
    ///   unchanged apart from objects that nothing references.
    pub fn from_connection_with(conn: Connection, options: StoreOptions) -> Result<Self> {
        let config = ConfigMap::new(conn.clone());
        let store = ObjectStore::new(conn.clone()).with_options(options);

        if !config.exists()? {
            info!("fresh file, writing default configuration");
            config.init()?;
            let graph = Graph::new(store, None)?;
            let mut file = Self::assemble(conn, config, graph, OpenKind::Fresh);
            file.commit()?;
            file.config.set(VERSION_KEY, CURRENT_VERSION)?;
            return Ok(file);
        }

        match config.version()? {
            None => {
                let mut graph = Graph::new(store, None)?;
                let report = import_legacy(&conn, &mut graph)?;
                let mut file = Self::assemble(conn, config, graph, OpenKind::Migrated(report));
                file.commit()?;
                file.config.set(VERSION_KEY, CURRENT_VERSION)?;
                file.conn.drop_table(LEGACY_TABLE)?;
                info!(version = CURRENT_VERSION, "migrated legacy file");
                Ok(file)
            }
            Some(version) if version == CURRENT_VERSION => {
                let head = config
                    .head()?
                    .ok_or_else(|| GpError::Corrupted("no head pointer".to_string()))?;
                let graph = Graph::new(store, Some(head))?;
                Ok(Self::assemble(conn, config, graph, OpenKind::Loaded))
            }
            Some(found) => Err(GpError::UnsupportedVersion {
                found,
                supported: CURRENT_VERSION,
            }),
        }
    }

    fn assemble(conn: Connection, config: ConfigMap, graph: Graph, opened: OpenKind) -> Self {
        Self {
            conn,
            config,
            graph,
            opened,
        }
    }

    /// Commits the working set and moves the head pointer to the new commit.
    pub fn commit(&mut self) -> Result<ObjectId> {
        let oid = self.graph.commit()?;
        self.config.set_head(oid)?;
        Ok(oid)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn head(&self) -> Option<ObjectId> {
        self.graph.head()
    }

    pub fn store(&self) -> &ObjectStore {
        self.graph.store()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// How the file was opened.
    pub fn opened(&self) -> &OpenKind {
        &self.opened
    }

    /// Commits reachable from the head, newest first.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<CommitInfo>> {
        history(self.store(), self.head(), limit)
    }

    /// Runs every verification check against this file.
    pub fn verify(&self) -> Result<VerifyReport> {
        verify(self.store(), self.head(), VerifyConfig::default())
    }
}
