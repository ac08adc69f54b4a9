//! CLI commands.

pub mod card;
pub mod cat;
pub mod config;
pub mod init;
pub mod link;
pub mod log;
pub mod objects;
pub mod show;
pub mod verify;

use anyhow::{anyhow, bail, Result};
use graphpaper_core::{CardId, EdgeId, GpError, Graph, GraphFile, ObjectId};
use std::path::Path;

/// Turns a core error into an anyhow error, appending the recovery hint if
/// there is one.
pub(crate) fn explain(err: GpError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(hint) => anyhow!("{}\n\nhint: {}", err, hint),
        None => anyhow::Error::new(err),
    }
}

/// Opens a graph file that must already exist.
pub(crate) fn open_existing(path: &Path) -> Result<GraphFile> {
    if !path.exists() {
        bail!(
            "{} does not exist (run 'gp init' to create it)",
            path.display()
        );
    }
    GraphFile::open(path)
        .map_err(explain)
        .map_err(|e| e.context(format!("Failed to open {}", path.display())))
}

/// Commits and prints the new head.
pub(crate) fn commit(file: &mut GraphFile) -> Result<ObjectId> {
    let head = file.commit().map_err(explain)?;
    println!("commit {}", head.short());
    Ok(head)
}

/// Picks the single candidate whose oid starts with `prefix`.
///
/// Candidates sharing one oid (identical cards) count as one match; the
/// first of them is returned.
fn resolve_prefix<K: Copy>(
    kind: &str,
    prefix: &str,
    candidates: impl Iterator<Item = (K, Option<ObjectId>)>,
) -> Result<K> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("empty {} id", kind);
    }

    let mut found: Option<(K, ObjectId)> = None;
    for (key, oid) in candidates {
        let Some(oid) = oid.filter(|oid| oid.as_hex().starts_with(&prefix)) else {
            continue;
        };
        match found {
            None => found = Some((key, oid)),
            Some((_, first)) if first == oid => {}
            Some(_) => bail!("{} id {:?} is ambiguous, use more characters", kind, prefix),
        }
    }

    found
        .map(|(key, _)| key)
        .ok_or_else(|| anyhow!("no {} matches {:?}", kind, prefix))
}

pub(crate) fn find_card(graph: &Graph, prefix: &str) -> Result<CardId> {
    resolve_prefix("card", prefix, graph.cards().map(|(id, card)| (id, card.oid())))
}

pub(crate) fn find_edge(graph: &Graph, prefix: &str) -> Result<EdgeId> {
    resolve_prefix("edge", prefix, graph.edges().map(|(id, edge)| (id, edge.oid())))
}

/// First line of a card's text, cut to `max` characters.
pub(crate) fn headline(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(max).collect();
    if line.chars().count() > max || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}
