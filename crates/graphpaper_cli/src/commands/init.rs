//! Create a new graph file.

use super::explain;
use anyhow::{bail, Context, Result};
use graphpaper_core::GraphFile;
use std::path::Path;

/// Initialize a new graph file at `path`.
pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let file = GraphFile::open(path)
        .map_err(explain)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let head = file.head().context("new file has no head commit")?;
    let viewport = file.config().viewport().map_err(explain)?;

    println!("Initialized graph file {}", path.display());
    println!();
    println!("Initial commit: {}", head.as_hex());
    println!(
        "Viewport:       {}x{} at ({}, {})",
        viewport.w, viewport.h, viewport.x, viewport.y
    );

    Ok(())
}
