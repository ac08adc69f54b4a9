//! Print a stored object.

use super::{explain, open_existing};
use anyhow::{anyhow, bail, Result};
use graphpaper_core::{canonical, ObjectId, ObjectStore};
use std::path::Path;

/// Print the contents of the object whose oid starts with `prefix`.
///
/// Records are pretty-printed; anything else is printed as text or, for
/// binary data, summarized.
pub fn run(path: &Path, prefix: &str) -> Result<()> {
    let file = open_existing(path)?;
    let store = file.store();
    let oid = resolve_object(store, prefix)?;
    let data = store.get(oid).map_err(explain)?;

    match canonical::decode(&data) {
        Ok(value) => println!("{:#}", value),
        Err(_) => match std::str::from_utf8(&data) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("(binary data, {} bytes)", data.len()),
        },
    }

    Ok(())
}

fn resolve_object(store: &ObjectStore, prefix: &str) -> Result<ObjectId> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.len() == ObjectId::HEX_LEN {
        return ObjectId::from_hex(&prefix).map_err(explain);
    }
    if prefix.is_empty() {
        bail!("empty object id");
    }

    let matches: Vec<ObjectId> = store
        .ids()
        .map_err(explain)?
        .into_iter()
        .filter(|oid| oid.as_hex().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [oid] => Ok(*oid),
        [] => Err(anyhow!("object {} not found", prefix)),
        _ => bail!(
            "object id {:?} is ambiguous ({} matches), use more characters",
            prefix,
            matches.len()
        ),
    }
}
