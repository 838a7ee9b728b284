//! Two-way diff model.
//!
//! [`FileDiffModel`] owns both texts of a file pair and the ordered delta list between them.
//! Every mutator computes the complete new list first and then swaps it in, bumping the
//! version and notifying subscribers, so readers never observe a half-propagated offset.
//!
//! # Example
//!
//! ```rust
//! use delta_core::{ChangeSide, DiffConfig, FileDiffModel, SimilarDiffProvider};
//!
//! let mut model = FileDiffModel::from_provider(
//!     "a\nb\nc\n",
//!     "a\nx\nc\n",
//!     &SimilarDiffProvider::default(),
//!     DiffConfig::default(),
//! )
//! .unwrap();
//!
//! let event = model.accept_at(0).unwrap().unwrap();
//! assert_eq!(event.inserted_text, "x\n");
//! assert_eq!(model.text(ChangeSide::Old), "a\nx\nc\n");
//! ```

use crate::builder::{CancelToken, DeltaBuilder};
use crate::config::DiffConfig;
use crate::content::{LineEnding, SideText, count_newlines};
use crate::delta::{
    ChangeDelta, ChangeSide, ChangeStatus, ChangeType, ConflictType, Placement, SideRange,
    TextEvent, shift, signed_diff,
};
use crate::error::DiffError;
use crate::events::{DeltaSnapshot, DiffEvent, DiffEventCallback, TextChangeEvent};
use crate::line_part::LinePartDelta;
use crate::script::{DiffProvider, EditScript};
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

/// Both texts of a file pair plus the deltas built between them.
///
/// Produced synchronously by the constructors of [`FileDiffModel`], or off-thread by
/// [`DiffWorker`](crate::DiffWorker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltDiff {
    old: SideText,
    new: SideText,
    deltas: Vec<ChangeDelta>,
}

impl BuiltDiff {
    /// Build from raw texts and a precomputed edit script over their normalized form.
    pub fn from_script(old: &str, new: &str, script: &EditScript) -> Result<Self, DiffError> {
        let old = SideText::new(old);
        let new = SideText::new(new);
        let deltas = DeltaBuilder::new(&old.text(), &new.text()).build(script)?;
        Ok(Self { old, new, deltas })
    }

    /// Ask `provider` for an edit script and build from it.
    ///
    /// `cancel` is checked before the provider runs and on every script op afterwards.
    pub fn compute<P>(
        old: &str,
        new: &str,
        provider: &P,
        cancel: Option<&CancelToken>,
    ) -> Result<Self, DiffError>
    where
        P: DiffProvider + ?Sized,
    {
        let old = SideText::new(old);
        let new = SideText::new(new);
        let (old_text, new_text) = (old.text(), new.text());

        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(DiffError::Cancelled);
        }
        let script = provider.edit_script(&old_text, &new_text);

        let mut builder = DeltaBuilder::new(&old_text, &new_text);
        if let Some(token) = cancel {
            builder = builder.with_cancel(token.clone());
        }
        let deltas = builder.build(&script)?;
        Ok(Self { old, new, deltas })
    }

    /// The built deltas.
    pub fn deltas(&self) -> &[ChangeDelta] {
        &self.deltas
    }

    /// LF-normalized text of one side.
    pub fn text(&self, side: ChangeSide) -> String {
        match side {
            ChangeSide::Old => self.old.text(),
            ChangeSide::New => self.new.text(),
        }
    }
}

/// State restored by [`FileDiffModel::reset`].
#[derive(Debug, Clone)]
struct Baseline {
    old: SideText,
    new: SideText,
    deltas: Arc<[ChangeDelta]>,
}

/// How an edit relates to the unchanged regions between deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditMode {
    /// A user edit. Touching an unchanged region creates a pending delta.
    Live,
    /// The base text moved underneath the model. Unchanged regions only shift.
    Rebase,
    /// Like `Rebase`, and an insertion right at the end of a delta joins that delta.
    RebaseAppend,
}

/// How [`FileDiffModel::resolve_at`] fills the target range.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolve {
    /// Replace it with the source side's content.
    Replace,
    /// Keep it and insert the source side's content after it.
    Append,
    /// Replace it with the given text.
    With(String),
}

/// Where a delta sits relative to the region touched by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Before,
    Overlap,
    After,
}

fn classify(range: &Range<usize>, region: &Range<usize>) -> Class {
    if range.start < region.end && range.end > region.start {
        Class::Overlap
    } else if range.is_empty() && region.is_empty() && range.start == region.start {
        Class::Overlap
    } else if range.end <= region.start {
        Class::Before
    } else {
        Class::After
    }
}

/// Region of `text` whose content changes with the edit, in pre-edit offsets.
///
/// Whole-line edits touch exactly their own range. Anything else touches every line the edit
/// starts in, ends in, or joins.
fn edit_region(
    text: &SideText,
    offset: usize,
    deleted_length: usize,
    inserted: &str,
) -> Range<usize> {
    let end = offset + deleted_length;
    let aligned = text.is_line_start(offset)
        && (deleted_length == 0 || text.rope().char(end - 1) == '\n')
        && (inserted.is_empty() || inserted.ends_with('\n'));
    if aligned {
        return offset..end;
    }
    let start = text.line_start(text.line_at(offset));
    let last_line = (text.line_at(end) + 1).min(text.line_count());
    start..text.line_start(last_line).max(end)
}

/// Assemble a delta from an edited-side range and an other-side range.
fn make_delta(
    side: ChangeSide,
    edited: SideRange,
    other: SideRange,
    status: ChangeStatus,
) -> Option<ChangeDelta> {
    let (old, new) = match side {
        ChangeSide::Old => (edited, other),
        ChangeSide::New => (other, edited),
    };
    let change_type = ChangeType::from_extents(old.text_len(), new.text_len());
    if change_type == ChangeType::Same {
        return None;
    }
    Some(ChangeDelta::new(change_type, old, new).with_status(status))
}

/// Re-derive the lines of insertion points sitting at the very end of `text`.
///
/// Whether the end offset opens a line of its own depends on the trailing newline, which an
/// edit elsewhere can add or remove.
fn settle_end_points(deltas: &mut [ChangeDelta], side: ChangeSide, text: &SideText) {
    let len = text.len_chars();
    for delta in deltas.iter_mut().rev() {
        let range = delta.range(side).text.clone();
        if !range.is_empty() || range.start != len {
            break;
        }
        *delta = delta.with_range(side, SideRange::new(text.line_range(&range), range));
    }
}

/// Two-way diff between an OLD and a NEW text.
///
/// # State machine
///
/// Each delta starts `Pending`. Accepting copies its NEW content into OLD, discarding copies
/// its OLD content back into NEW; both are terminal for that delta. Any delta can become
/// `Undefined` when a live edit spans past it, and stays so until the model is rebuilt via
/// [`FileDiffModel::install`] or [`FileDiffModel::reset`].
pub struct FileDiffModel {
    old: SideText,
    new: SideText,
    deltas: Arc<[ChangeDelta]>,
    version: u64,
    baseline: Baseline,
    config: DiffConfig,
    callbacks: Vec<DiffEventCallback>,
}

impl FileDiffModel {
    /// Build a model from raw texts and an edit script over their normalized form.
    pub fn new(old: &str, new: &str, script: &EditScript) -> Result<Self, DiffError> {
        Self::with_config(old, new, script, DiffConfig::default())
    }

    /// Like [`FileDiffModel::new`], with an explicit configuration.
    pub fn with_config(
        old: &str,
        new: &str,
        script: &EditScript,
        config: DiffConfig,
    ) -> Result<Self, DiffError> {
        Ok(Self::from_built(BuiltDiff::from_script(old, new, script)?, config))
    }

    /// Build a model, asking `provider` for the edit script.
    pub fn from_provider<P>(
        old: &str,
        new: &str,
        provider: &P,
        config: DiffConfig,
    ) -> Result<Self, DiffError>
    where
        P: DiffProvider + ?Sized,
    {
        Ok(Self::from_built(
            BuiltDiff::compute(old, new, provider, None)?,
            config,
        ))
    }

    /// Wrap an already built diff.
    pub fn from_built(built: BuiltDiff, config: DiffConfig) -> Self {
        let deltas: Arc<[ChangeDelta]> = built.deltas.into();
        Self {
            baseline: Baseline {
                old: built.old.clone(),
                new: built.new.clone(),
                deltas: deltas.clone(),
            },
            old: built.old,
            new: built.new,
            deltas,
            version: 0,
            config,
            callbacks: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Current version; incremented by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Consistent view of the current delta list.
    pub fn snapshot(&self) -> DeltaSnapshot {
        DeltaSnapshot {
            version: self.version,
            deltas: self.deltas.clone(),
        }
    }

    /// Current deltas.
    pub fn deltas(&self) -> &[ChangeDelta] {
        &self.deltas
    }

    /// Delta at `index`, if any.
    pub fn delta(&self, index: usize) -> Option<&ChangeDelta> {
        self.deltas.get(index)
    }

    /// Current LF-normalized text of one side.
    pub fn text(&self, side: ChangeSide) -> String {
        self.side_text(side).text()
    }

    /// Storage of one side.
    pub fn side_text(&self, side: ChangeSide) -> &SideText {
        match side {
            ChangeSide::Old => &self.old,
            ChangeSide::New => &self.new,
        }
    }

    /// Line ending one side was loaded with.
    pub fn line_ending(&self, side: ChangeSide) -> LineEnding {
        self.side_text(side).line_ending()
    }

    /// Text of one side with its original line ending restored.
    pub fn text_for_saving(&self, side: ChangeSide) -> String {
        self.side_text(side).text_for_saving()
    }

    /// Index of `delta` in the current list.
    pub fn position_of(&self, delta: &ChangeDelta) -> Result<usize, DiffError> {
        self.deltas
            .iter()
            .position(|d| d == delta)
            .ok_or(DiffError::StaleDelta)
    }

    /// Subscribe to model events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DiffEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Accept `delta`: copy its NEW content over its OLD range.
    ///
    /// Returns the splice applied to the OLD text, or `None` if the delta was not pending.
    pub fn accept_delta(
        &mut self,
        delta: &ChangeDelta,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        let index = self.position_of(delta)?;
        self.accept_at(index)
    }

    /// Accept the delta at `index`.
    pub fn accept_at(&mut self, index: usize) -> Result<Option<TextChangeEvent>, DiffError> {
        self.resolve_at(index, ChangeSide::Old, Resolve::Replace)
    }

    /// Discard `delta`: copy its OLD content back over its NEW range.
    ///
    /// Returns the splice applied to the NEW text, or `None` if the delta was not pending
    /// (discarding twice is a no-op).
    pub fn discard_change(
        &mut self,
        delta: &ChangeDelta,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        let index = self.position_of(delta)?;
        self.discard_at(index)
    }

    /// Discard the delta at `index`.
    pub fn discard_at(&mut self, index: usize) -> Result<Option<TextChangeEvent>, DiffError> {
        self.resolve_at(index, ChangeSide::New, Resolve::Replace)
    }

    /// Accept `delta` by inserting its NEW content after its OLD range, keeping what OLD
    /// already has there.
    pub fn append_delta(
        &mut self,
        delta: &ChangeDelta,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        let index = self.position_of(delta)?;
        self.append_at(index)
    }

    /// Append the delta at `index`; see [`FileDiffModel::append_delta`].
    pub fn append_at(&mut self, index: usize) -> Result<Option<TextChangeEvent>, DiffError> {
        self.resolve_at(index, ChangeSide::Old, Resolve::Append)
    }

    /// Accept the delta at `index`, writing `content` over its OLD range instead of its own
    /// NEW content.
    pub(crate) fn accept_with(
        &mut self,
        index: usize,
        content: String,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        self.resolve_at(index, ChangeSide::Old, Resolve::With(content))
    }

    /// Apply a live edit to the NEW text. CRLF newlines in `text` are normalized.
    ///
    /// Deltas before the edit keep their coordinates, deltas after it are shifted, and a delta
    /// the edit falls into absorbs it. An edit in an unchanged region creates a pending delta
    /// for the lines it touches.
    pub fn process_text_event(
        &mut self,
        offset: usize,
        deleted_length: usize,
        text: &str,
    ) -> Result<(), DiffError> {
        self.apply_text_edit(ChangeSide::New, offset, deleted_length, text, EditMode::Live)
    }

    /// Drop all mutations and return to the texts and deltas the model was built with.
    pub fn reset(&mut self) {
        let baseline = self.baseline.clone();
        self.replace_texts(baseline.old, baseline.new);
        self.publish(baseline.deltas);
    }

    /// Replace texts and deltas with a freshly computed diff, which also becomes the new
    /// reset point.
    pub fn install(&mut self, built: BuiltDiff) {
        let deltas: Arc<[ChangeDelta]> = built.deltas.into();
        self.baseline = Baseline {
            old: built.old.clone(),
            new: built.new.clone(),
            deltas: deltas.clone(),
        };
        self.replace_texts(built.old, built.new);
        self.publish(deltas);
    }

    /// Word-level sub-changes of the delta at `index`.
    pub fn line_part_changes(&self, index: usize) -> Result<Arc<[LinePartDelta]>, DiffError> {
        let delta = self.deltas.get(index).ok_or(DiffError::DeltaIndex {
            index,
            len: self.deltas.len(),
        })?;
        delta.line_part_changes(&self.old, &self.new, &self.config)
    }

    /// Copy one side of the delta at `index` over the other side.
    ///
    /// `target` is the side being written.
    fn resolve_at(
        &mut self,
        index: usize,
        target: ChangeSide,
        resolve: Resolve,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        let delta = self.deltas.get(index).ok_or(DiffError::DeltaIndex {
            index,
            len: self.deltas.len(),
        })?;
        match delta.status() {
            ChangeStatus::Pending => {}
            ChangeStatus::Undefined => {
                log::warn!("delta {index} is undefined; recompute the diff before resolving it");
                return Ok(None);
            }
            status => {
                log::debug!("delta {index} is already {status:?}");
                return Ok(None);
            }
        }

        let status = match target {
            ChangeSide::Old => ChangeStatus::Accepted,
            ChangeSide::New => ChangeStatus::Discarded,
        };
        let current = delta.range(target).text.clone();
        let source = || delta.content(target.other(), self.side_text(target.other()));
        let (offset, inserted_text) = match resolve {
            Resolve::Replace => (current.start, source()),
            Resolve::Append => (current.end, source()),
            Resolve::With(content) => (current.start, content),
        };
        let event = TextChangeEvent {
            side: target,
            offset,
            deleted_length: current.end - offset,
            inserted_text,
        };
        let resolved_text = current.start..event.offset + event.inserted_len();
        let deleted = event.offset..current.end;
        let line_offset = signed_diff(
            count_newlines(&event.inserted_text),
            self.side_text(target).newlines_in(&deleted),
        );
        let text_offset = signed_diff(event.inserted_len(), event.deleted_length);

        let mut after = self.side_text(target).clone();
        after.splice(event.offset, event.deleted_length, &event.inserted_text);
        let resolved = SideRange::new(after.line_range(&resolved_text), resolved_text);

        let mut deltas: Vec<ChangeDelta> = self
            .deltas
            .iter()
            .enumerate()
            .map(|(i, d)| match i.cmp(&index) {
                Ordering::Less => d.clone(),
                Ordering::Equal => d.with_range(target, resolved.clone()).with_status(status),
                Ordering::Greater => d.apply_offset(target, line_offset, text_offset),
            })
            .collect();
        settle_end_points(&mut deltas, target, &after);

        *self.side_mut(target) = after;
        log::debug!(
            "{status:?} delta {index}: {target:?} offset {} -{} +{}",
            event.offset,
            event.deleted_length,
            event.inserted_len()
        );
        self.notify(&DiffEvent::TextChanged(event.clone()));
        self.publish(deltas);
        Ok(Some(event))
    }

    /// Apply an edit to one side and re-derive the affected deltas.
    pub(crate) fn apply_text_edit(
        &mut self,
        side: ChangeSide,
        offset: usize,
        deleted_length: usize,
        text: &str,
        mode: EditMode,
    ) -> Result<(), DiffError> {
        let edited = self.side_text(side);
        let len = edited.len_chars();
        if offset
            .checked_add(deleted_length)
            .is_none_or(|end| end > len)
        {
            return Err(DiffError::Range {
                offset,
                length: deleted_length,
                len,
            });
        }
        if deleted_length == 0 && text.is_empty() {
            return Ok(());
        }
        let normalized;
        let text = if text.contains("\r\n") {
            normalized = LineEnding::normalize(text);
            normalized.as_str()
        } else {
            text
        };

        let deleted = edited.slice(&(offset..offset + deleted_length));
        let region = edit_region(edited, offset, deleted_length, text);
        let line_offset = signed_diff(count_newlines(text), count_newlines(&deleted));
        let text_offset = signed_diff(text.chars().count(), deleted_length);
        let mut after = edited.clone();
        after.splice(offset, deleted_length, text);

        let deltas = &self.deltas;
        let before_end = deltas
            .iter()
            .take_while(|d| classify(&d.range(side).text, &region) == Class::Before)
            .count();
        let overlap_end = before_end
            + deltas[before_end..]
                .iter()
                .take_while(|d| classify(&d.range(side).text, &region) == Class::Overlap)
                .count();
        let overlapped = &deltas[before_end..overlap_end];

        let mut out: Vec<ChangeDelta> = Vec::with_capacity(deltas.len() + 1);
        out.extend(deltas[..before_end].iter().cloned());

        let appending = mode == EditMode::RebaseAppend;
        let snap_target = (appending && region.is_empty() && overlapped.is_empty())
            .then(|| out.last())
            .flatten()
            .filter(|d| d.range(side).text.end == region.start)
            .cloned();

        if let Some(target) = snap_target {
            let range = &target.range(side).text;
            let text_range = range.start..shift(range.end, text_offset);
            let lines = after.line_range(&text_range);
            out.pop();
            out.push(target.absorbed(side, SideRange::new(lines, text_range)));
        } else {
            let other = side.other();
            let other_bounds = out.last().map_or(0, |d| d.range(other).text.end)
                ..deltas.get(overlap_end).map_or_else(
                    || self.side_text(other).len_chars(),
                    |d| d.range(other).text.start,
                );
            let edit = EditShape {
                side,
                offset,
                deleted: &deleted,
                inserted: text,
                region: &region,
                text_offset,
                after: &after,
                other_bounds,
            };
            let replacement = match overlapped {
                [] if mode == EditMode::Live => self.gap_delta(&edit, out.last()),
                [] => None,
                [delta] => self.absorb(&edit, delta),
                _ => self.merge_overlapped(&edit, overlapped, ChangeStatus::Undefined),
            };
            out.extend(replacement);
        }

        out.extend(
            deltas[overlap_end..]
                .iter()
                .map(|d| d.apply_offset(side, line_offset, text_offset)),
        );

        log::trace!(
            "{side:?} edit at {offset} -{deleted_length} +{}: {} overlapped deltas",
            text.chars().count(),
            overlapped.len()
        );
        settle_end_points(&mut out, side, &after);
        *self.side_mut(side) = after;
        self.publish(out);
        Ok(())
    }

    /// New pending delta for an edit that touches no existing delta.
    fn gap_delta(&self, edit: &EditShape<'_>, prev: Option<&ChangeDelta>) -> Option<ChangeDelta> {
        let side = edit.side;
        let other = self.side_text(side.other());
        // Between deltas both sides are identical, so offsets map one to one.
        let map = |pos: usize| match prev {
            Some(d) => d.range(side.other()).text.end + (pos - d.range(side).text.end),
            None => pos,
        };
        let other_text = map(edit.region.start)..map(edit.region.end);
        let edited_text = edit.region.start..shift(edit.region.end, edit.text_offset);
        if edit.after.slice(&edited_text) == other.slice(&other_text) {
            return None;
        }
        make_delta(
            side,
            SideRange::new(edit.after.line_range(&edited_text), edited_text),
            SideRange::new(other.line_range(&other_text), other_text),
            ChangeStatus::Pending,
        )
    }

    /// Fold an edit into the single delta it overlaps.
    fn absorb(&self, edit: &EditShape<'_>, delta: &ChangeDelta) -> Option<ChangeDelta> {
        let side = edit.side;
        let range = delta.range(side).text.clone();
        let deleted_length = edit.deleted.chars().count();
        let delete_end = edit.offset + deleted_length;

        let mut current = Some(delta.clone());
        if deleted_length > 0 {
            let event = TextEvent::delete(edit.offset, edit.deleted);
            let contained = edit.offset >= range.start && delete_end <= range.end;
            current = current
                .filter(|d| contained && d.placement(side, &event) == Placement::Interior)
                .map(|d| d.process_text_event(side, &event));
        }
        if !edit.inserted.is_empty() {
            let event = TextEvent::insert(edit.offset, edit.inserted);
            current = current
                .filter(|d| d.placement(side, &event) == Placement::Interior)
                .map(|d| d.process_text_event(side, &event));
        }
        // Keep the absorbed delta only while it still covers whole lines; removing its final
        // newline joins it with the next line.
        if let Some(updated) = current
            && edit.after.is_line_boundary(updated.range(side).text.start)
            && edit.after.is_line_boundary(updated.range(side).text.end)
        {
            let text = updated.range(side).text.clone();
            let lines = edit.after.line_range(&text);
            let updated = updated.absorbed(side, SideRange::new(lines, text));
            return (!updated.is_vacant()).then_some(updated);
        }

        let exceeds = deleted_length > 0
            && edit.offset <= range.start
            && delete_end >= range.end
            && (edit.offset < range.start || delete_end > range.end);
        let status = if exceeds {
            ChangeStatus::Undefined
        } else {
            delta.status()
        };
        self.merge_overlapped(edit, std::slice::from_ref(delta), status)
    }

    /// One delta covering the edit region and every overlapped delta.
    fn merge_overlapped(
        &self,
        edit: &EditShape<'_>,
        overlapped: &[ChangeDelta],
        status: ChangeStatus,
    ) -> Option<ChangeDelta> {
        let side = edit.side;
        let other = side.other();
        let (first, last) = (overlapped.first()?, overlapped.last()?);
        let first_range = &first.range(side).text;
        let last_range = &last.range(side).text;

        let start = edit.region.start.min(first_range.start);
        let end = edit.region.end.max(last_range.end);
        let edited_text = start..shift(end, edit.text_offset);
        // After a rebase the gaps of the other side may be shorter than the edited ones.
        let bounds = &edit.other_bounds;
        let other_end = (last.range(other).text.end + (end - last_range.end)).min(bounds.end);
        let other_start = first
            .range(other)
            .text
            .start
            .saturating_sub(first_range.start - start)
            .clamp(bounds.start.min(other_end), other_end);
        let other_side = self.side_text(other);
        let other_text = other_side.expand_to_lines(&(other_start..other_end));

        let status = if overlapped.iter().any(|d| d.status() == ChangeStatus::Undefined) {
            ChangeStatus::Undefined
        } else {
            status
        };
        make_delta(
            side,
            SideRange::new(edit.after.line_range(&edited_text), edited_text),
            SideRange::new(other_side.line_range(&other_text), other_text),
            status,
        )
    }

    /// Set conflict markers; publishes only when something changed.
    pub(crate) fn set_conflicts(&mut self, flags: &[ConflictType]) -> bool {
        let unchanged = self.deltas.len() == flags.len()
            && self
                .deltas
                .iter()
                .zip(flags)
                .all(|(d, flag)| d.conflict() == *flag);
        if unchanged {
            return false;
        }
        let deltas: Vec<ChangeDelta> = self
            .deltas
            .iter()
            .zip(flags.iter().chain(std::iter::repeat(&ConflictType::None)))
            .map(|(d, flag)| d.with_conflict(*flag))
            .collect();
        self.publish(deltas);
        true
    }

    fn side_mut(&mut self, side: ChangeSide) -> &mut SideText {
        match side {
            ChangeSide::Old => &mut self.old,
            ChangeSide::New => &mut self.new,
        }
    }

    /// Swap both texts, announcing every side whose content differs.
    fn replace_texts(&mut self, old: SideText, new: SideText) {
        for (side, replacement) in [(ChangeSide::Old, old), (ChangeSide::New, new)] {
            if *self.side_text(side) != replacement {
                let event = TextChangeEvent {
                    side,
                    offset: 0,
                    deleted_length: self.side_text(side).len_chars(),
                    inserted_text: replacement.text(),
                };
                *self.side_mut(side) = replacement;
                self.notify(&DiffEvent::TextChanged(event));
            } else {
                *self.side_mut(side) = replacement;
            }
        }
    }

    fn publish(&mut self, deltas: impl Into<Arc<[ChangeDelta]>>) {
        self.deltas = deltas.into();
        self.version += 1;
        let event = DiffEvent::DeltaListChanged(self.snapshot());
        self.notify(&event);
    }

    fn notify(&mut self, event: &DiffEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}

/// An edit being applied, as seen from the model.
struct EditShape<'a> {
    side: ChangeSide,
    offset: usize,
    deleted: &'a str,
    inserted: &'a str,
    /// Pre-edit region whose content changes.
    region: &'a Range<usize>,
    text_offset: isize,
    /// Edited side after the edit.
    after: &'a SideText,
    /// Room on the other side between the neighbouring deltas.
    other_bounds: Range<usize>,
}
