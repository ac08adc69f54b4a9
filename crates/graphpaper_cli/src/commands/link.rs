//! Edge commands.

use super::{commit, explain, find_card, find_edge, open_existing};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Connect two cards.
pub fn link(path: &Path, orig: &str, dest: &str) -> Result<()> {
    let mut file = open_existing(path)?;
    let orig = find_card(file.graph(), orig)?;
    let dest = find_card(file.graph(), dest)?;

    let id = file.graph_mut().new_edge(orig, dest).map_err(explain)?;
    commit(&mut file)?;

    let oid = file
        .graph()
        .edge(id)
        .and_then(|edge| edge.oid())
        .context("edge was not saved")?;
    println!("edge {}", style(oid.short()).cyan());
    Ok(())
}

/// Remove an edge, leaving its cards in place.
pub fn unlink(path: &Path, prefix: &str) -> Result<()> {
    let mut file = open_existing(path)?;
    let id = find_edge(file.graph(), prefix)?;

    file.graph_mut().delete_edge(id).map_err(explain)?;
    commit(&mut file)?;
    println!("removed edge");
    Ok(())
}
