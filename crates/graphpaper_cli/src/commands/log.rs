//! Commit history.

use super::{explain, open_existing};
use anyhow::Result;
use console::style;
use std::path::Path;

/// Show commit history from the head, newest first.
pub fn run(path: &Path, limit: Option<usize>) -> Result<()> {
    let file = open_existing(path)?;
    let commits = file.history(limit).map_err(explain)?;

    for commit in &commits {
        println!("{} {}", style("commit").yellow(), commit.oid.as_hex());
        if let Some(parent) = commit.parent {
            println!("Parent: {}", parent.short());
        }
        println!(
            "Cards:  {}   Edges: {}",
            commit.cards.len(),
            commit.edges.len()
        );
        println!();
    }

    if commits.is_empty() {
        println!("No commits found.");
    }

    Ok(())
}
