//! Card editing commands. Each one commits exactly once.

use super::{commit, explain, find_card, open_existing};
use anyhow::{Context, Result};
use console::style;
use graphpaper_core::{Card, CardId, GraphFile};
use std::path::Path;

/// Applies `edit` to the card matching `prefix`, commits, and prints the
/// card's new oid.
fn edit_card(path: &Path, prefix: &str, edit: impl FnOnce(&mut Card)) -> Result<()> {
    let mut file = open_existing(path)?;
    let id = find_card(file.graph(), prefix)?;
    edit(card_mut(&mut file, id)?);
    commit(&mut file)?;
    print_card(&file, id)
}

fn card_mut(file: &mut GraphFile, id: CardId) -> Result<&mut Card> {
    file.graph_mut()
        .card_mut(id)
        .context("card vanished from the working set")
}

fn print_card(file: &GraphFile, id: CardId) -> Result<()> {
    let card = file
        .graph()
        .card(id)
        .context("card vanished from the working set")?;
    let oid = card.oid().context("card was not saved")?;
    println!(
        "card {}  ({}, {}) {}x{}",
        style(oid.short()).cyan(),
        card.x(),
        card.y(),
        card.w(),
        card.h()
    );
    Ok(())
}

pub fn add(path: &Path, text: &str, x: i64, y: i64, w: i64, h: i64) -> Result<()> {
    let mut file = open_existing(path)?;
    let id = file.graph_mut().new_card(x, y, w, h);
    card_mut(&mut file, id)?.set_text(text);
    commit(&mut file)?;
    print_card(&file, id)
}

pub fn text(path: &Path, prefix: &str, text: &str) -> Result<()> {
    edit_card(path, prefix, |card| card.set_text(text))
}

pub fn move_to(path: &Path, prefix: &str, x: i64, y: i64) -> Result<()> {
    edit_card(path, prefix, |card| card.set_pos(x, y))
}

/// Sizes below the minimum card size are raised to it.
pub fn resize(path: &Path, prefix: &str, w: i64, h: i64) -> Result<()> {
    edit_card(path, prefix, |card| card.set_size(w, h))
}

pub fn remove(path: &Path, prefix: &str) -> Result<()> {
    let mut file = open_existing(path)?;
    let id = find_card(file.graph(), prefix)?;
    let edges = file.graph().edges_of(id).count();

    file.graph_mut().delete_card(id).map_err(explain)?;
    commit(&mut file)?;

    println!(
        "removed card{}",
        if edges > 0 {
            format!(" and {} edge(s)", edges)
        } else {
            String::new()
        }
    );
    Ok(())
}
