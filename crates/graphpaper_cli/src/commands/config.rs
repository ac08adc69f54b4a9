//! Configuration values.

use super::{explain, open_existing};
use anyhow::{bail, Result};
use graphpaper_core::{HEAD_KEY, VERSION_KEY};
use std::path::Path;

/// List all values, print one, or set one.
///
/// `head` and `version` are managed by the file itself and can't be set.
pub fn run(path: &Path, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let file = open_existing(path)?;
    let config = file.config();

    match (key, value) {
        (None, _) => {
            for (key, value) in config.entries().map_err(explain)? {
                println!("{} = {}", key, value);
            }
        }
        (Some(key), None) => match config.get(key).map_err(explain)? {
            Some(value) => println!("{}", value),
            None => bail!("{} is not set", key),
        },
        (Some(key), Some(_)) if key == HEAD_KEY || key == VERSION_KEY => {
            bail!("{} is managed by gp and can't be set by hand", key)
        }
        (Some(key), Some(value)) => config.set(key, value).map_err(explain)?,
    }

    Ok(())
}
