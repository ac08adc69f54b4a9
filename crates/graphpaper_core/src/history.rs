//! Walking the commit chain.

use crate::error::Result;
use crate::graph::load_commit;
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;

/// One commit on the history chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub oid: ObjectId,
    pub parent: Option<ObjectId>,
    pub cards: Vec<ObjectId>,
    pub edges: Vec<ObjectId>,
}

/// Follows `parent` links from `head`, newest first.
///
/// Stops after `limit` commits when given. Only commit records are read, so
/// a damaged card or edge doesn't stop the walk.
///
/// # Errors
///
/// `InvalidCommit` if a commit on the chain is missing or malformed.
pub fn history(
    store: &ObjectStore,
    head: Option<ObjectId>,
    limit: Option<usize>,
) -> Result<Vec<CommitInfo>> {
    let mut commits = Vec::new();
    let mut next = head;

    while let Some(oid) = next {
        if limit.is_some_and(|limit| commits.len() >= limit) {
            break;
        }

        let commit = load_commit(store, oid)?;
        next = commit.parent;
        commits.push(CommitInfo {
            oid,
            parent: commit.parent,
            cards: commit.cards.clone(),
            edges: commit.edges.clone(),
        });
    }

    Ok(commits)
}
