//! Cards: positioned text notes.

use crate::error::Result;
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use crate::record::{ExtraFields, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `objtype` of stored cards.
pub const CARD_OBJTYPE: &str = "card";

/// Smallest width and height a card can be given.
pub const MIN_CARD_SIZE: i64 = 20;

/// Handle to a card in a [`Graph`](crate::Graph) working set.
///
/// Handles are never reused within one `Graph`, so a handle to a card that
/// was removed by a commit simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub(crate) u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Stored fields of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    /// Always [`CARD_OBJTYPE`].
    pub objtype: String,
    /// Free text shown on the card.
    pub text: String,
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width.
    pub w: i64,
    /// Height.
    pub h: i64,
    /// Keys this build doesn't know about.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for CardFields {
    fn default() -> Self {
        Self {
            objtype: CARD_OBJTYPE.to_string(),
            text: String::new(),
            x: 0,
            y: 0,
            w: MIN_CARD_SIZE,
            h: MIN_CARD_SIZE,
            extra: ExtraFields::new(),
        }
    }
}

/// A card with change tracking and a transient deletion flag.
///
/// Every setter clears the card's own oid; the graph re-saves dirty cards on
/// the next commit. The deletion flag is never persisted.
#[derive(Debug, Clone)]
pub struct Card {
    record: Record<CardFields>,
    deleted: bool,
}

impl Default for Card {
    fn default() -> Self {
        Self {
            record: Record::new(CardFields::default()),
            deleted: false,
        }
    }
}

impl Card {
    /// Creates an unsaved card at the origin with the minimum size and no text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a card from the store.
    ///
    /// # Errors
    ///
    /// `WrongObjectType` if the object isn't a card, `InvalidObject` if any
    /// of `text`, `x`, `y`, `w`, `h` is missing or mistyped.
    pub fn load(store: &ObjectStore, oid: ObjectId) -> Result<Self> {
        Ok(Self {
            record: Record::load_kind(store, oid, CARD_OBJTYPE)?,
            deleted: false,
        })
    }

    /// Saves the card and returns its new oid.
    pub fn save(&mut self, store: &ObjectStore) -> Result<ObjectId> {
        self.record.save(store)
    }

    /// Address of the last save or load, or `None` if edited since.
    pub fn oid(&self) -> Option<ObjectId> {
        self.record.oid()
    }

    /// True if the card has changes that are not yet stored.
    pub fn is_dirty(&self) -> bool {
        !self.record.is_saved()
    }

    /// True if the card will be dropped on the next commit.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Marks the card for removal on the next commit. Idempotent.
    pub fn delete(&mut self) {
        self.deleted = true;
    }

    /// The stored fields.
    pub fn fields(&self) -> &CardFields {
        self.record.fields()
    }

    pub fn text(&self) -> &str {
        &self.record.text
    }

    pub fn x(&self) -> i64 {
        self.record.x
    }

    pub fn y(&self) -> i64 {
        self.record.y
    }

    pub fn w(&self) -> i64 {
        self.record.w
    }

    pub fn h(&self) -> i64 {
        self.record.h
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.record.fields_mut().text = text.into();
    }

    pub fn set_x(&mut self, x: i64) {
        self.record.fields_mut().x = x;
    }

    pub fn set_y(&mut self, y: i64) {
        self.record.fields_mut().y = y;
    }

    pub fn set_pos(&mut self, x: i64, y: i64) {
        let fields = self.record.fields_mut();
        fields.x = x;
        fields.y = y;
    }

    /// Sets the width, floored at [`MIN_CARD_SIZE`].
    pub fn set_w(&mut self, w: i64) {
        self.record.fields_mut().w = w.max(MIN_CARD_SIZE);
    }

    /// Sets the height, floored at [`MIN_CARD_SIZE`].
    pub fn set_h(&mut self, h: i64) {
        self.record.fields_mut().h = h.max(MIN_CARD_SIZE);
    }

    /// Sets both dimensions, each floored at [`MIN_CARD_SIZE`].
    pub fn set_size(&mut self, w: i64, h: i64) {
        self.set_w(w);
        self.set_h(h);
    }
}
