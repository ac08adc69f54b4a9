//! One-time import of cards from the legacy `cards` table.
//!
//! Files from before commits existed keep one row per card, keyed by an
//! opaque hash. A row's value comes in one of two shapes:
//!
//! - positional: `{x,y,w,h}text`, where the text runs to the end of the
//!   value and may span lines;
//! - JSON: a mapping with at least `x`, `y`, `w`, `h` and `text`.
//!
//! Either way the width and height must be positive.

use crate::canonical;
use crate::connection::Connection;
use crate::error::{GpError, Result};
use crate::graph::Graph;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Table holding legacy cards.
pub const LEGACY_TABLE: &str = "cards";

/// A card as parsed from a legacy row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyCard {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub text: String,
}

/// Outcome of [`import_legacy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// False if the file had no legacy table at all.
    pub table_found: bool,
    /// Number of cards added to the graph.
    pub imported: usize,
}

fn invalid(msg: impl Into<String>) -> GpError {
    GpError::InvalidCard(msg.into())
}

/// Parses one legacy row value.
///
/// # Examples
///
/// ```
/// use graphpaper_core::parse_legacy_card;
///
/// let card = parse_legacy_card("{-100,-50,200,100}Foobar baz").unwrap();
/// assert_eq!((card.x, card.y, card.w, card.h), (-100, -50, 200, 100));
/// assert_eq!(card.text, "Foobar baz");
///
/// assert!(parse_legacy_card("{0,0,0,50}text").is_err());
/// ```
///
/// # Errors
///
/// `InvalidCard` if the value matches neither shape or has a non-positive
/// width or height.
pub fn parse_legacy_card(raw: &str) -> Result<LegacyCard> {
    let card = if is_positional(raw) {
        parse_positional(raw)?
    } else {
        parse_json(raw)?
    };

    if card.w <= 0 {
        return Err(invalid(format!("card width must be > 0, got {}", card.w)));
    }
    if card.h <= 0 {
        return Err(invalid(format!("card height must be > 0, got {}", card.h)));
    }
    Ok(card)
}

fn is_positional(raw: &str) -> bool {
    raw.strip_prefix('{')
        .is_some_and(|rest| rest.starts_with(|c: char| c == '-' || c.is_ascii_digit()))
}

fn parse_positional(raw: &str) -> Result<LegacyCard> {
    let body = &raw[1..];
    let (header, text) = body
        .split_once('}')
        .ok_or_else(|| invalid("positional card is missing its closing '}'"))?;

    let fields: Vec<&str> = header.split(',').collect();
    let [x, y, w, h] = fields.as_slice() else {
        return Err(invalid(format!(
            "positional card needs 4 fields, got {}",
            fields.len()
        )));
    };

    Ok(LegacyCard {
        x: parse_coord(x)?,
        y: parse_coord(y)?,
        w: parse_coord(w)?,
        h: parse_coord(h)?,
        text: text.to_string(),
    })
}

/// Accepts an optional leading `-` followed by ASCII digits, nothing else.
fn parse_coord(field: &str) -> Result<i64> {
    let digits = field.strip_prefix('-').unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("{:?} is not an integer", field)));
    }
    field
        .parse()
        .map_err(|_| invalid(format!("{:?} is out of range", field)))
}

fn parse_json(raw: &str) -> Result<LegacyCard> {
    let value = canonical::decode(raw.as_bytes())
        .map_err(|_| invalid("could not parse card at all"))?;
    serde_json::from_value(value)
        .map_err(|e| invalid(format!("card data is incomplete: {}", e)))
}

/// Adds one card to `graph` for every row of the legacy table.
///
/// Nothing is committed and the legacy table is left in place; the caller
/// commits once and drops the table afterwards. A missing table imports
/// nothing.
///
/// # Errors
///
/// `InvalidCard` for the first row that doesn't parse. Cards added before
/// that row stay in the working set.
pub fn import_legacy(conn: &Connection, graph: &mut Graph) -> Result<MigrationReport> {
    if !conn.has_table(LEGACY_TABLE)? {
        warn!("file has no version and no legacy card table; starting empty");
        return Ok(MigrationReport::default());
    }

    let mut report = MigrationReport {
        table_found: true,
        imported: 0,
    };

    for (key, bytes) in conn.entries(LEGACY_TABLE)? {
        let raw = String::from_utf8(bytes)
            .map_err(|_| invalid(format!("row {:?} is not UTF-8", key)))?;
        let legacy = parse_legacy_card(&raw).map_err(|e| match e {
            GpError::InvalidCard(msg) => invalid(format!("row {:?}: {}", key, msg)),
            e => e,
        })?;

        let id = graph.new_card(legacy.x, legacy.y, legacy.w, legacy.h);
        if let Some(card) = graph.card_mut(id) {
            card.set_text(legacy.text);
        }
        debug!(row = %key, "imported legacy card");
        report.imported += 1;
    }

    info!(imported = report.imported, "imported legacy cards");
    Ok(report)
}
