//! File verification.
//!
//! Reads every stored object back, checks that it still hashes to its key
//! and is in canonical form, and loads every commit on the head's chain as a
//! full graph. Objects no commit reaches are counted but never removed.

use crate::canonical;
use crate::error::{GpError, Result};
use crate::graph::{load_commit, Graph};
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use std::collections::HashSet;
use tracing::warn;

/// Which checks [`verify`] runs.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Read and re-hash every stored object.
    pub check_objects: bool,

    /// Load every commit on the history chain as a graph.
    pub check_commits: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            check_objects: true,
            check_commits: true,
        }
    }
}

/// Report from file verification.
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Total number of objects checked.
    pub objects_checked: usize,

    /// Objects whose bytes no longer match their address, or can't be read.
    pub objects_corrupted: Vec<ObjectId>,

    /// Objects that decode but are not in canonical form.
    pub objects_noncanonical: Vec<ObjectId>,

    /// Number of commits checked.
    pub commits_checked: usize,

    /// Commits that fail to load, with the reason.
    pub commits_invalid: Vec<(ObjectId, String)>,

    /// Objects not referenced by any commit on the chain. Informational.
    pub unreachable: Vec<ObjectId>,
}

impl VerifyReport {
    /// Returns true if any issues were found. Unreachable objects don't count.
    pub fn has_issues(&self) -> bool {
        !self.objects_corrupted.is_empty()
            || !self.objects_noncanonical.is_empty()
            || !self.commits_invalid.is_empty()
    }

    /// Returns a summary message.
    pub fn summary(&self) -> String {
        if !self.has_issues() {
            return "File is healthy. No issues found.".to_string();
        }

        let mut issues = Vec::new();
        if !self.objects_corrupted.is_empty() {
            issues.push(format!("{} corrupted objects", self.objects_corrupted.len()));
        }
        if !self.objects_noncanonical.is_empty() {
            issues.push(format!(
                "{} non-canonical objects",
                self.objects_noncanonical.len()
            ));
        }
        if !self.commits_invalid.is_empty() {
            issues.push(format!("{} invalid commits", self.commits_invalid.len()));
        }
        format!("File has issues: {}", issues.join(", "))
    }
}

/// Verifies the objects of a store and the commit chain starting at `head`.
///
/// # Examples
///
/// ```
/// use graphpaper_core::{verify, GraphFile, VerifyConfig};
///
/// let file = GraphFile::open_in_memory().unwrap();
/// let report = verify(file.store(), file.head(), VerifyConfig::default()).unwrap();
/// assert!(!report.has_issues());
/// ```
///
/// # Errors
///
/// Only failures of the backing database are returned as errors; everything
/// else ends up in the report.
pub fn verify(
    store: &ObjectStore,
    head: Option<ObjectId>,
    config: VerifyConfig,
) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();
    let mut reachable = HashSet::new();

    if config.check_commits {
        check_commits(store, head, &mut report, &mut reachable)?;
    }

    if config.check_objects {
        check_objects(store, &mut report, &reachable, config.check_commits)?;
    }

    Ok(report)
}

fn is_backend_failure(err: &GpError) -> bool {
    matches!(err, GpError::Storage(_) | GpError::Io(_))
}

fn check_commits(
    store: &ObjectStore,
    head: Option<ObjectId>,
    report: &mut VerifyReport,
    reachable: &mut HashSet<ObjectId>,
) -> Result<()> {
    let mut next = head;

    while let Some(oid) = next {
        report.commits_checked += 1;

        let commit = match load_commit(store, oid) {
            Ok(commit) => commit,
            Err(e) if is_backend_failure(&e) => return Err(e),
            Err(e) => {
                warn!(commit = %oid.short(), error = %e, "commit does not load");
                report.commits_invalid.push((oid, e.to_string()));
                // The parent link is lost with the record
                break;
            }
        };

        reachable.insert(oid);
        reachable.extend(commit.cards.iter().copied());
        reachable.extend(commit.edges.iter().copied());

        match Graph::new(store.clone(), Some(oid)) {
            Ok(_) => {}
            Err(e) if is_backend_failure(&e) => return Err(e),
            Err(e) => {
                warn!(commit = %oid.short(), error = %e, "commit does not load as a graph");
                report.commits_invalid.push((oid, e.to_string()));
            }
        }

        next = commit.parent;
    }

    Ok(())
}

fn check_objects(
    store: &ObjectStore,
    report: &mut VerifyReport,
    reachable: &HashSet<ObjectId>,
    track_reachability: bool,
) -> Result<()> {
    for oid in store.ids()? {
        report.objects_checked += 1;

        match store.get(oid) {
            Ok(bytes) => {
                if !canonical::is_canonical(&bytes) {
                    report.objects_noncanonical.push(oid);
                }
            }
            Err(e) if is_backend_failure(&e) => return Err(e),
            Err(e) => {
                warn!(oid = %oid.short(), error = %e, "object is corrupted");
                report.objects_corrupted.push(oid);
            }
        }

        if track_reachability && !reachable.contains(&oid) {
            report.unreachable.push(oid);
        }
    }

    Ok(())
}
