//! Error taxonomy for the delta engine.

use thiserror::Error;

/// Errors produced while building or mutating delta lists.
///
/// `ChangeStatus::Undefined` is deliberately not represented here: an undefined delta is a
/// valid state of the model, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("malformed edit script at op {index}: {reason}")]
    /// The edit script handed to the builder violates ordering, kind or length rules.
    MalformedEditScript {
        /// Index of the offending operation (or the op count for trailing checks).
        index: usize,
        /// Human readable description of the violation.
        reason: String,
    },

    #[error("edit at offset {offset} with length {length} is outside the text (length {len})")]
    /// An edit offset/length falls outside `[0, len]`.
    Range {
        /// Start offset of the rejected edit.
        offset: usize,
        /// Length of the rejected edit.
        length: usize,
        /// Length of the text the edit was aimed at.
        len: usize,
    },

    #[error("delta index {index} is out of bounds (delta count {len})")]
    /// A delta index is past the end of the delta list.
    DeltaIndex {
        /// Requested index.
        index: usize,
        /// Current delta count.
        len: usize,
    },

    #[error("delta is not part of the current delta list")]
    /// The delta was superseded by a previous mutation; re-fetch the current snapshot.
    StaleDelta,

    #[error("diff computation was cancelled")]
    /// A recomputation was superseded by a newer request.
    Cancelled,

    #[error("invalid diff configuration: {0}")]
    /// The configuration could not be parsed.
    Config(String),
}

impl DiffError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEditScript {
            index,
            reason: reason.into(),
        }
    }
}
