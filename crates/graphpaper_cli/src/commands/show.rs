//! Print the working set at the head commit.

use super::{explain, headline, open_existing};
use anyhow::Result;
use console::style;
use graphpaper_core::OpenKind;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let file = open_existing(path)?;
    let graph = file.graph();

    if let OpenKind::Migrated(report) = file.opened() {
        println!(
            "{} converted legacy file ({} cards imported)",
            style("note:").yellow(),
            report.imported
        );
    }

    match file.head() {
        Some(head) => println!("{} {}", style("head").bold(), head.as_hex()),
        None => println!("{} (none)", style("head").bold()),
    }
    let viewport = file.config().viewport().map_err(explain)?;
    println!(
        "viewport {}x{} at ({}, {})",
        viewport.w, viewport.h, viewport.x, viewport.y
    );

    println!();
    println!("{} ({})", style("Cards").bold(), graph.cards().count());
    for (_, card) in graph.cards() {
        let oid = card.oid().map(|o| o.short()).unwrap_or_default();
        println!(
            "  {}  {:>6},{:<6} {:>5}x{:<5} {}",
            style(oid).cyan(),
            card.x(),
            card.y(),
            card.w(),
            card.h(),
            headline(card.text(), 40)
        );
    }

    println!();
    println!("{} ({})", style("Edges").bold(), graph.edges().count());
    for (_, edge) in graph.edges() {
        let short = |id| {
            graph
                .card(id)
                .and_then(|card| card.oid())
                .map(|oid| oid.short())
                .unwrap_or_else(|| "?".to_string())
        };
        let oid = edge.oid().map(|o| o.short()).unwrap_or_default();
        println!(
            "  {}  {} -> {}",
            style(oid).cyan(),
            short(edge.orig()),
            short(edge.dest())
        );
    }

    Ok(())
}
