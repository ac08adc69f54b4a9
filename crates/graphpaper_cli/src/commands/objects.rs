//! List stored objects.

use super::{explain, open_existing};
use anyhow::Result;
use console::style;
use graphpaper_core::canonical;
use std::path::Path;

/// List every object with its kind and size.
pub fn run(path: &Path) -> Result<()> {
    let file = open_existing(path)?;
    let store = file.store();
    let ids = store.ids().map_err(explain)?;

    for oid in &ids {
        let kind = match store.get(*oid) {
            Ok(bytes) => {
                let objtype = canonical::decode(&bytes)
                    .ok()
                    .and_then(|value| value.get("objtype")?.as_str().map(str::to_string))
                    .unwrap_or_else(|| "?".to_string());
                format!("{:<8} {:>7} bytes", objtype, bytes.len())
            }
            Err(e) => style(format!("unreadable: {}", e)).red().to_string(),
        };
        println!("{}  {}", style(oid.short()).cyan(), kind);
    }

    println!();
    println!("{} objects", ids.len());
    Ok(())
}
