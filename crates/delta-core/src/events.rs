//! Change notifications and snapshots published by the diff models.

use crate::delta::{ChangeDelta, ChangeSide};
use std::sync::Arc;

/// A splice a text widget showing `side` must perform to stay in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChangeEvent {
    /// Side whose text changed.
    pub side: ChangeSide,
    /// Character offset of the splice.
    pub offset: usize,
    /// Number of characters removed at `offset`.
    pub deleted_length: usize,
    /// Text inserted at `offset` after the removal.
    pub inserted_text: String,
}

impl TextChangeEvent {
    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Apply the splice to a copy of `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.inserted_text.len());
        let mut chars = text.chars();
        out.extend(chars.by_ref().take(self.offset));
        out.push_str(&self.inserted_text);
        out.extend(chars.skip(self.deleted_length));
        out
    }
}

/// Immutable view of a delta list at one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaSnapshot {
    /// Model version the list belongs to.
    pub version: u64,
    /// The deltas, ordered by their OLD position.
    pub deltas: Arc<[ChangeDelta]>,
}

impl DeltaSnapshot {
    /// Number of deltas.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Whether there are no deltas.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Iterate over the deltas.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeDelta> {
        self.deltas.iter()
    }
}

/// Event delivered to model subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffEvent {
    /// The delta list changed shape or content.
    DeltaListChanged(DeltaSnapshot),
    /// One side's text was spliced by the model itself (accept, discard, reset).
    TextChanged(TextChangeEvent),
}

/// Subscriber callback type.
pub type DiffEventCallback = Box<dyn FnMut(&DiffEvent) + Send>;
