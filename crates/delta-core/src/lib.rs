#![warn(missing_docs)]
//! Delta Core - Diff/Merge Delta Engine
//!
//! # Overview
//!
//! `delta-core` represents the differences between two versions of a text as an ordered list
//! of editable regions ([`ChangeDelta`]s) and keeps that list consistent while a user accepts,
//! discards or directly edits text. Two coupled lists over one shared base text give a
//! three-way merge view with conflict detection.
//!
//! It does not compute line diffs itself beyond a default [`SimilarDiffProvider`], does not
//! talk to repositories, and does not render anything.
//!
//! # Core Features
//!
//! - **Dual coordinates**: every delta carries line and character ranges on both sides
//! - **Accept / discard**: splices one side into the other and re-indexes later deltas
//! - **Live edits**: keystrokes are absorbed into deltas, or create new ones
//! - **Three-way merge**: conflict marking, identical-change resolution, "accept both"
//! - **Snapshots**: every mutation publishes an immutable, versioned delta list
//! - **Background recompute**: cancellable, last-request-wins [`DiffWorker`]
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MergeModel (yours / theirs over one base)  │  ← Three-way merge
//! ├─────────────────────────────────────────────┤
//! │  FileDiffModel (accept, discard, edits)     │  ← Two-way diff state
//! ├─────────────────────────────────────────────┤
//! │  ChangeDelta / LinePartDelta                │  ← Pure delta transforms
//! ├─────────────────────────────────────────────┤
//! │  DeltaBuilder                               │  ← Edit script → deltas
//! ├─────────────────────────────────────────────┤
//! │  EditScript / DiffProvider                  │  ← Line diff input
//! ├─────────────────────────────────────────────┤
//! │  SideText (Rope-based)                      │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Two-way diff
//!
//! ```rust
//! use delta_core::{ChangeSide, ChangeType, EditOp, EditScript, FileDiffModel};
//!
//! let script = EditScript::new(vec![
//!     EditOp::equal(0..1, 0..1),
//!     EditOp::replace(1..2, 1..2),
//!     EditOp::equal(2..3, 2..3),
//! ]);
//! let mut model = FileDiffModel::new("a\nb\nc\n", "a\nx\nc\n", &script).unwrap();
//! assert_eq!(model.deltas()[0].change_type(), ChangeType::Modify);
//!
//! // Type into the live (NEW) side
//! model.process_text_event(4, 0, "y\n").unwrap();
//! assert_eq!(model.text(ChangeSide::New), "a\nx\ny\nc\n");
//! ```
//!
//! ## Subscribing to changes
//!
//! ```rust
//! use delta_core::{DiffConfig, DiffEvent, FileDiffModel, SimilarDiffProvider};
//!
//! let provider = SimilarDiffProvider::default();
//! let mut model =
//!     FileDiffModel::from_provider("a\n", "b\n", &provider, DiffConfig::default()).unwrap();
//!
//! model.subscribe(|event| {
//!     if let DiffEvent::DeltaListChanged(snapshot) = event {
//!         println!("version {}: {} deltas", snapshot.version, snapshot.len());
//!     }
//! });
//! model.accept_at(0).unwrap();
//! ```
//!
//! # Module Description
//!
//! - [`content`] - Rope-backed side texts and line endings
//! - [`script`] - Edit scripts, diff providers and merge alignment
//! - [`builder`] - Edit script to delta conversion, cancellation
//! - [`delta`] - `ChangeDelta` and its pure transforms
//! - [`line_part`] - Word-level sub-changes
//! - [`file_diff`] - Two-way model
//! - [`merge`] - Three-way model
//! - [`events`] - Events and snapshots
//! - [`worker`] - Background recomputation
//! - [`config`] - Configuration
//!
//! # Coordinates
//!
//! - All character offsets count Unicode scalar values
//! - Texts are LF-normalized internally; the original line ending is kept per side

pub mod builder;
pub mod config;
pub mod content;
pub mod delta;
pub mod error;
pub mod events;
pub mod file_diff;
pub mod line_part;
pub mod merge;
pub mod script;
pub mod worker;

pub use builder::{CancelToken, DeltaBuilder};
pub use config::{DiffAlgorithm, DiffConfig};
pub use content::{LineEnding, SideText, count_lines, count_newlines};
pub use delta::{
    ChangeDelta, ChangeSide, ChangeStatus, ChangeType, ConflictType, Placement, SideRange,
    TextEvent, TextEventKind,
};
pub use error::DiffError;
pub use events::{DeltaSnapshot, DiffEvent, DiffEventCallback, TextChangeEvent};
pub use file_diff::{BuiltDiff, FileDiffModel};
pub use line_part::LinePartDelta;
pub use merge::{ConflictKind, ConflictPair, ConflictSide, MergeModel};
pub use script::{
    DiffProvider, EditKind, EditOp, EditScript, SimilarDiffProvider, align_for_merge,
};
pub use worker::{DiffResult, DiffWorker};
