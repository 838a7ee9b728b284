//! Change deltas: the atomic unit of difference between an OLD and a NEW text.
//!
//! A [`ChangeDelta`] records the region it covers on both sides, in lines and in character
//! offsets (Unicode scalar values) into that side's *current* full text. Deltas are values:
//! every transformation returns a new delta, and the owning model swaps whole lists.

use crate::config::DiffConfig;
use crate::content::SideText;
use crate::error::DiffError;
use crate::line_part::{self, LinePartDelta};
use std::ops::Range;
use std::sync::{Arc, OnceLock};

/// Which text of a diff a coordinate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSide {
    /// The original (or base) text.
    Old,
    /// The modified (live) text.
    New,
}

impl ChangeSide {
    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Self::Old => Self::New,
            Self::New => Self::Old,
        }
    }
}

/// Kind of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Content exists only on the NEW side.
    Add,
    /// Content exists only on the OLD side.
    Delete,
    /// Content differs on both sides.
    Modify,
    /// No change. Never materialized as a delta; it is the gap between deltas.
    Same,
}

impl ChangeType {
    /// Derive the type from the per-side extents of a region.
    pub fn from_extents(old_len: usize, new_len: usize) -> Self {
        match (old_len, new_len) {
            (0, 0) => Self::Same,
            (0, _) => Self::Add,
            (_, 0) => Self::Delete,
            _ => Self::Modify,
        }
    }
}

/// Lifecycle state of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChangeStatus {
    /// Not yet acted upon.
    #[default]
    Pending,
    /// NEW content was copied into OLD.
    Accepted,
    /// OLD content was copied back into NEW.
    Discarded,
    /// An edit made the delta's extent unreliable; recompute the diff before acting on it.
    Undefined,
}

/// Conflict marker, only ever set by [`MergeModel`](crate::MergeModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConflictType {
    /// Not conflicting.
    #[default]
    None,
    /// Overlaps a delta of the other merge side on the base text.
    Conflicting,
}

/// Line and character range of a delta on one side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SideRange {
    /// End-exclusive line range.
    pub lines: Range<usize>,
    /// End-exclusive character range.
    pub text: Range<usize>,
}

impl SideRange {
    /// Create a range.
    pub fn new(lines: Range<usize>, text: Range<usize>) -> Self {
        Self { lines, text }
    }

    /// A zero-length insertion point.
    pub fn point(line: usize, offset: usize) -> Self {
        Self::new(line..line, offset..offset)
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of characters covered.
    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// Whether the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Non-empty text covers at least one line, empty text none.
    pub(crate) fn covering_lines(mut self) -> Self {
        self.lines.end = if self.text.is_empty() {
            self.lines.start
        } else {
            self.lines.end.max(self.lines.start + 1)
        };
        self
    }

    /// Shift both endpoints of both ranges.
    pub fn shifted(&self, line_offset: isize, text_offset: isize) -> Self {
        Self {
            lines: shift(self.lines.start, line_offset)..shift(self.lines.end, line_offset),
            text: shift(self.text.start, text_offset)..shift(self.text.end, text_offset),
        }
    }
}

/// Intersection test shared by deltas and their line parts.
pub(crate) fn ranges_conflict(a: &Range<usize>, b: &Range<usize>) -> bool {
    if a.is_empty() && b.is_empty() {
        return a.start == b.start;
    }
    a.start < b.end && b.start < a.end
}

pub(crate) fn shift(value: usize, by: isize) -> usize {
    value.saturating_add_signed(by)
}

/// Difference in length between two extents, as a signed offset.
pub(crate) fn signed_diff(after: usize, before: usize) -> isize {
    after as isize - before as isize
}

/// Direction of a [`TextEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEventKind {
    /// `text` was inserted at `offset`.
    Insert,
    /// `text` was removed starting at `offset`.
    Delete,
}

/// A single insert or delete applied to one side's text.
///
/// The event carries the inserted or deleted text so a delta can count the newlines that fall
/// before, inside or after its own range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    /// Insert or delete.
    pub kind: TextEventKind,
    /// Character offset of the edit in the pre-edit text.
    pub offset: usize,
    text: String,
    length: usize,
}

impl TextEvent {
    /// An insertion of `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(TextEventKind::Insert, offset, text.into())
    }

    /// A deletion of `deleted_text` starting at `offset`.
    pub fn delete(offset: usize, deleted_text: impl Into<String>) -> Self {
        Self::new(TextEventKind::Delete, offset, deleted_text.into())
    }

    fn new(kind: TextEventKind, offset: usize, text: String) -> Self {
        let length = text.chars().count();
        Self {
            kind,
            offset,
            text,
            length,
        }
    }

    /// Inserted or deleted text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the edit in characters.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Exclusive end offset of a deletion in the pre-edit text.
    pub fn end(&self) -> usize {
        match self.kind {
            TextEventKind::Insert => self.offset,
            TextEventKind::Delete => self.offset + self.length,
        }
    }

    /// Number of newlines in the event text.
    pub fn newlines(&self) -> usize {
        self.newlines_before(usize::MAX)
    }

    /// Number of newlines in the event text that lie before absolute offset `pos`.
    pub fn newlines_before(&self, pos: usize) -> usize {
        let take = pos.saturating_sub(self.offset);
        self.text.chars().take(take).filter(|c| *c == '\n').count()
    }
}

/// Where an edit falls relative to a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The edit is entirely before the delta; the delta has to be shifted.
    Preceding,
    /// The edit overlaps the delta's range and must be absorbed.
    Interior,
    /// The edit is entirely after the delta; the delta is unaffected.
    Following,
}

#[derive(Debug, Clone)]
struct LineParts {
    key: (usize, bool),
    parts: Arc<[LinePartDelta]>,
}

/// A contiguous region of difference between the OLD and NEW text.
#[derive(Debug, Clone)]
pub struct ChangeDelta {
    old: SideRange,
    new: SideRange,
    change_type: ChangeType,
    status: ChangeStatus,
    conflict: ConflictType,
    line_parts: OnceLock<LineParts>,
}

impl PartialEq for ChangeDelta {
    fn eq(&self, other: &Self) -> bool {
        self.old == other.old
            && self.new == other.new
            && self.change_type == other.change_type
            && self.status == other.status
            && self.conflict == other.conflict
    }
}

impl Eq for ChangeDelta {}

impl ChangeDelta {
    /// Create a pending, non-conflicting delta.
    pub fn new(change_type: ChangeType, old: SideRange, new: SideRange) -> Self {
        Self {
            old,
            new,
            change_type,
            status: ChangeStatus::Pending,
            conflict: ConflictType::None,
            line_parts: OnceLock::new(),
        }
    }

    /// Range on the given side.
    pub fn range(&self, side: ChangeSide) -> &SideRange {
        match side {
            ChangeSide::Old => &self.old,
            ChangeSide::New => &self.new,
        }
    }

    /// Change type.
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// Status.
    pub fn status(&self) -> ChangeStatus {
        self.status
    }

    /// Conflict marker.
    pub fn conflict(&self) -> ConflictType {
        self.conflict
    }

    /// Shorthand for `status() == ChangeStatus::Pending`.
    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }

    /// The delta's content on one side.
    pub fn content(&self, side: ChangeSide, text: &SideText) -> String {
        text.slice(&self.range(side).text)
    }

    /// Shift the line and character range of one side.
    ///
    /// Used to re-index every delta positioned after an edit point. Memoized line parts are
    /// carried over, shifted the same way.
    pub fn apply_offset(&self, side: ChangeSide, line_offset: isize, text_offset: isize) -> Self {
        let line_parts = OnceLock::new();
        if let Some(memo) = self.line_parts.get() {
            let parts = memo
                .parts
                .iter()
                .map(|part| part.shifted(side, text_offset))
                .collect();
            let _ = line_parts.set(LineParts {
                key: memo.key,
                parts,
            });
        }
        let mut out = self.with_range(side, self.range(side).shifted(line_offset, text_offset));
        out.line_parts = line_parts;
        out
    }

    /// Whether the two deltas touch the same region of the shared OLD (base) text.
    ///
    /// Non-empty ranges conflict when they intersect; an insertion point conflicts with a
    /// range it lies strictly inside of, and with an insertion point at the same offset.
    pub fn is_conflicting_with(&self, other: &ChangeDelta) -> bool {
        ranges_conflict(&self.old.text, &other.old.text)
    }

    /// Copy marked as accepted.
    pub fn accept_change(&self) -> Self {
        self.with_status(ChangeStatus::Accepted)
    }

    /// Copy marked as discarded.
    pub fn discard_change(&self) -> Self {
        self.with_status(ChangeStatus::Discarded)
    }

    pub(crate) fn with_status(&self, status: ChangeStatus) -> Self {
        Self {
            status,
            ..self.fresh()
        }
    }

    pub(crate) fn with_conflict(&self, conflict: ConflictType) -> Self {
        let mut out = self.clone();
        out.conflict = conflict;
        out
    }

    /// Copy with one side's range replaced.
    pub(crate) fn with_range(&self, side: ChangeSide, range: SideRange) -> Self {
        let mut out = self.fresh();
        match side {
            ChangeSide::Old => out.old = range,
            ChangeSide::New => out.new = range,
        }
        out
    }

    /// Like [`ChangeDelta::with_range`], re-deriving the type once a side is empty.
    pub(crate) fn absorbed(&self, side: ChangeSide, range: SideRange) -> Self {
        let mut out = self.with_range(side, range);
        if out.old.is_empty() || out.new.is_empty() {
            out.change_type = ChangeType::from_extents(out.old.text_len(), out.new.text_len());
        }
        out
    }

    /// Whether the delta no longer covers anything on either side.
    pub(crate) fn is_vacant(&self) -> bool {
        self.old.is_empty() && self.new.is_empty()
    }

    /// Copy without memoized line parts.
    fn fresh(&self) -> Self {
        Self {
            old: self.old.clone(),
            new: self.new.clone(),
            change_type: self.change_type,
            status: self.status,
            conflict: self.conflict,
            line_parts: OnceLock::new(),
        }
    }

    /// Classify an edit on `side` against this delta's range on that side.
    ///
    /// An insert exactly at the start boundary precedes the delta; one at the end boundary
    /// follows it. A delete is interior as soon as it removes at least one character of the
    /// delta (or, for an insertion point, spans it).
    pub fn placement(&self, side: ChangeSide, event: &TextEvent) -> Placement {
        let range = &self.range(side).text;
        let (start, end) = (range.start, range.end);
        let offset = event.offset;
        match event.kind {
            TextEventKind::Insert => {
                if offset <= start {
                    Placement::Preceding
                } else if offset >= end {
                    Placement::Following
                } else {
                    Placement::Interior
                }
            }
            TextEventKind::Delete => {
                if event.end() <= start {
                    Placement::Preceding
                } else if offset >= end {
                    Placement::Following
                } else {
                    Placement::Interior
                }
            }
        }
    }

    /// Absorb an edit that falls inside this delta's range on `side`.
    ///
    /// Edits classified as [`Placement::Preceding`] or [`Placement::Following`] return the
    /// delta unchanged; the caller shifts it with [`ChangeDelta::apply_offset`] instead.
    ///
    /// Only a deletion that covers the whole range and reaches past at least one of its ends
    /// makes the delta [`ChangeStatus::Undefined`]. Line ranges are adjusted by newline
    /// counts; a caller holding the edited text re-derives them when the edit removed the
    /// delta's final newline.
    pub fn process_text_event(&self, side: ChangeSide, event: &TextEvent) -> Self {
        if self.placement(side, event) != Placement::Interior {
            return self.clone();
        }

        let range = self.range(side);
        let (start, end) = (range.text.start, range.text.end);
        let (start_line, end_line) = (range.lines.start, range.lines.end);
        let offset = event.offset;
        let length = event.length();

        let updated = match event.kind {
            TextEventKind::Insert => SideRange::new(
                start_line..end_line + event.newlines(),
                start..end + length,
            ),
            TextEventKind::Delete => {
                let delete_end = event.end();
                let before = event.newlines_before(start);
                let spans = offset <= start && delete_end >= end;
                if spans && (offset < start || delete_end > end) {
                    let line = start_line.saturating_sub(before);
                    return self
                        .absorbed(side, SideRange::point(line, offset))
                        .with_status(ChangeStatus::Undefined);
                } else if offset < start {
                    // Deletion reaches into the delta from the front.
                    let lines = start_line.saturating_sub(before)
                        ..end_line.saturating_sub(event.newlines());
                    SideRange::new(lines, offset..end - length)
                } else if delete_end <= end {
                    SideRange::new(
                        start_line..end_line.saturating_sub(event.newlines()),
                        start..end - length,
                    )
                } else {
                    // Deletion starts inside and runs past the end; the rest of it falls into
                    // the region that follows.
                    let inside = event.newlines_before(end);
                    SideRange::new(start_line..end_line.saturating_sub(inside), start..offset)
                }
            }
        };
        self.absorbed(side, updated.covering_lines())
    }

    /// Word-level sub-changes between this delta's OLD and NEW content.
    ///
    /// Offsets of the returned parts are absolute in the side texts. Deltas spanning more than
    /// [`DiffConfig::word_diff_line_limit`] lines are split at line granularity. The result is
    /// memoized on this delta instance.
    pub fn line_part_changes(
        &self,
        old: &SideText,
        new: &SideText,
        config: &DiffConfig,
    ) -> Result<Arc<[LinePartDelta]>, DiffError> {
        let key = (config.word_diff_line_limit, config.word_granularity);
        if let Some(memo) = self.line_parts.get()
            && memo.key == key
        {
            return Ok(memo.parts.clone());
        }

        let by_words = config.word_granularity
            && self.old.line_count().max(self.new.line_count()) <= config.word_diff_line_limit;
        let parts: Arc<[LinePartDelta]> = line_part::derive(
            &self.content(ChangeSide::Old, old),
            &self.content(ChangeSide::New, new),
            self.old.text.start,
            self.new.text.start,
            by_words,
        )?
        .into();

        let _ = self.line_parts.set(LineParts {
            key,
            parts: parts.clone(),
        });
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modify(old: Range<usize>, new: Range<usize>) -> ChangeDelta {
        ChangeDelta::new(
            ChangeType::Modify,
            SideRange::new(1..2, old),
            SideRange::new(1..2, new),
        )
    }

    #[test]
    fn test_equality_ignores_memo() {
        let delta = modify(2..4, 2..4);
        let old = SideText::new("a\nb\nc\n");
        let new = SideText::new("a\nx\nc\n");
        let _ = delta
            .line_part_changes(&old, &new, &DiffConfig::default())
            .unwrap();
        assert_eq!(delta, modify(2..4, 2..4));
    }

    #[test]
    fn test_newlines_before() {
        let event = TextEvent::delete(3, "x\ny\nz");
        assert_eq!(event.newlines(), 2);
        assert_eq!(event.newlines_before(5), 1);
        assert_eq!(event.newlines_before(3), 0);
    }
}
