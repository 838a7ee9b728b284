//! Line-level edit scripts and the diff providers that produce them.
//!
//! An [`EditScript`] is an ordered, non-overlapping list of [`EditOp`]s over two
//! line-indexed texts. Lines follow the `split_inclusive('\n')` model: every line carries
//! its newline, and a trailing partial line counts as a line.
//!
//! The engine never cares *how* a script was computed. [`SimilarDiffProvider`] is the
//! default [`DiffProvider`], backed by the `similar` crate.

use crate::config::DiffAlgorithm;
use similar::{DiffOp, DiffTag, TextDiff};
use std::ops::Range;

/// Operation kind of an edit script entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Lines are identical on both sides.
    Equal,
    /// Lines exist only on the NEW side.
    Insert,
    /// Lines exist only on the OLD side.
    Delete,
    /// OLD lines were replaced by NEW lines.
    Replace,
}

impl EditKind {
    /// Kind of a change covering `old_len` OLD lines and `new_len` NEW lines.
    ///
    /// Returns [`EditKind::Equal`] when both are empty.
    pub fn from_extents(old_len: usize, new_len: usize) -> Self {
        match (old_len, new_len) {
            (0, 0) => Self::Equal,
            (0, _) => Self::Insert,
            (_, 0) => Self::Delete,
            _ => Self::Replace,
        }
    }
}

/// One entry of an edit script: a kind plus an end-exclusive line range per side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditOp {
    /// Operation kind.
    pub kind: EditKind,
    /// Line range on the OLD side.
    pub old: Range<usize>,
    /// Line range on the NEW side.
    pub new: Range<usize>,
}

impl EditOp {
    /// Create an operation.
    pub fn new(kind: EditKind, old: Range<usize>, new: Range<usize>) -> Self {
        Self { kind, old, new }
    }

    /// An `Equal` run.
    pub fn equal(old: Range<usize>, new: Range<usize>) -> Self {
        Self::new(EditKind::Equal, old, new)
    }

    /// An `Insert` at OLD line `at`.
    pub fn insert(at: usize, new: Range<usize>) -> Self {
        Self::new(EditKind::Insert, at..at, new)
    }

    /// A `Delete` whose NEW insertion point is line `at`.
    pub fn delete(old: Range<usize>, at: usize) -> Self {
        Self::new(EditKind::Delete, old, at..at)
    }

    /// A `Replace`.
    pub fn replace(old: Range<usize>, new: Range<usize>) -> Self {
        Self::new(EditKind::Replace, old, new)
    }

    /// Whether this op describes a change (anything but `Equal`).
    pub fn is_change(&self) -> bool {
        self.kind != EditKind::Equal
    }
}

/// An ordered list of edit operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<EditOp>,
}

impl EditScript {
    /// Create a script from operations. No validation happens here; the
    /// [`DeltaBuilder`](crate::DeltaBuilder) rejects malformed scripts.
    pub fn new(ops: Vec<EditOp>) -> Self {
        Self { ops }
    }

    /// All operations, including `Equal` runs.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Operations that describe a change.
    pub fn changes(&self) -> impl Iterator<Item = &EditOp> {
        self.ops.iter().filter(|op| op.is_change())
    }

    /// Whether the script contains no change at all.
    pub fn is_unchanged(&self) -> bool {
        self.changes().next().is_none()
    }

    /// Convert `similar` ops into a script, coalescing adjacent change ops into one.
    pub fn from_diff_ops(ops: &[DiffOp]) -> Self {
        let mut out: Vec<EditOp> = Vec::with_capacity(ops.len());
        for op in ops {
            let (tag, old, new) = op.as_tag_tuple();
            if tag == DiffTag::Equal {
                out.push(EditOp::equal(old, new));
                continue;
            }
            match out.last_mut() {
                Some(prev) if prev.is_change() && prev.old.end == old.start => {
                    prev.old.end = old.end;
                    prev.new.end = new.end;
                    prev.kind = EditKind::from_extents(prev.old.len(), prev.new.len());
                }
                _ => out.push(EditOp::new(
                    EditKind::from_extents(old.len(), new.len()),
                    old,
                    new,
                )),
            }
        }
        Self { ops: out }
    }
}

impl From<Vec<EditOp>> for EditScript {
    fn from(ops: Vec<EditOp>) -> Self {
        Self::new(ops)
    }
}

/// Source of line-level edit scripts.
pub trait DiffProvider {
    /// Compute the edit script turning `old` into `new`. Both texts are LF-normalized.
    fn edit_script(&self, old: &str, new: &str) -> EditScript;
}

/// [`DiffProvider`] backed by `similar`'s line diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimilarDiffProvider {
    algorithm: DiffAlgorithm,
}

impl SimilarDiffProvider {
    /// Create a provider using the given algorithm.
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl DiffProvider for SimilarDiffProvider {
    fn edit_script(&self, old: &str, new: &str) -> EditScript {
        let diff = TextDiff::configure()
            .algorithm(self.algorithm.into())
            .diff_lines(old, new);
        EditScript::from_diff_ops(diff.ops())
    }
}

/// Widen the change ops of two scripts sharing one OLD (base) text so that every pair of
/// overlapping changes references exactly the same base lines.
///
/// The NEW side of a widened op grows by the same number of lines, taken from the
/// surrounding unchanged region. Ops of one script that the widening makes overlap are
/// merged. `Equal` runs are dropped; the builder treats gaps as unchanged.
pub fn align_for_merge(yours: &mut EditScript, theirs: &mut EditScript) {
    yours.ops.retain(EditOp::is_change);
    theirs.ops.retain(EditOp::is_change);

    while let Some(target) = first_misaligned_overlap(&yours.ops, &theirs.ops) {
        widen(&mut yours.ops, &target);
        widen(&mut theirs.ops, &target);
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn first_misaligned_overlap(yours: &[EditOp], theirs: &[EditOp]) -> Option<Range<usize>> {
    for a in yours {
        for b in theirs {
            if a.old != b.old && overlaps(&a.old, &b.old) {
                return Some(a.old.start.min(b.old.start)..a.old.end.max(b.old.end));
            }
        }
    }
    None
}

/// Whether widening an op to `target` has to swallow `op`. Insertions strictly inside
/// `target` count, since they would otherwise end up inside the widened op.
fn swallowed(op: &EditOp, target: &Range<usize>) -> bool {
    if op.old.is_empty() {
        target.start < op.old.start && op.old.start < target.end
    } else {
        overlaps(&op.old, target)
    }
}

fn widen(ops: &mut Vec<EditOp>, target: &Range<usize>) {
    let Some(first) = ops.iter().position(|op| swallowed(op, target)) else {
        return;
    };
    let last = ops
        .iter()
        .rposition(|op| swallowed(op, target))
        .unwrap_or(first);

    let old = target.start.min(ops[first].old.start)..target.end.max(ops[last].old.end);
    // Outside change ops both sides are identical, so the gap maps line for line.
    let new_start = ops[first]
        .new
        .start
        .saturating_sub(ops[first].old.start - old.start);
    let new_end = ops[last].new.end + (old.end - ops[last].old.end);

    let merged = EditOp::new(
        EditKind::from_extents(old.len(), new_end - new_start),
        old,
        new_start..new_end,
    );
    ops.splice(first..=last, std::iter::once(merged));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similar_provider_reports_replace() {
        let script = SimilarDiffProvider::default().edit_script("a\nb\nc\n", "a\nx\nc\n");
        let changes: Vec<_> = script.changes().cloned().collect();
        assert_eq!(changes, vec![EditOp::replace(1..2, 1..2)]);
    }

    #[test]
    fn test_identical_texts_have_no_changes() {
        let script = SimilarDiffProvider::default().edit_script("a\nb\n", "a\nb\n");
        assert!(script.is_unchanged());
    }

    #[test]
    fn test_align_widens_both_sides() {
        // yours rewrites base lines 1..3, theirs only line 2..3
        let mut yours = EditScript::new(vec![EditOp::replace(1..3, 1..2)]);
        let mut theirs = EditScript::new(vec![EditOp::replace(2..3, 2..4)]);
        align_for_merge(&mut yours, &mut theirs);

        assert_eq!(yours.ops(), &[EditOp::replace(1..3, 1..2)]);
        assert_eq!(theirs.ops(), &[EditOp::replace(1..3, 1..4)]);
    }

    #[test]
    fn test_align_merges_ops_swallowed_by_widening() {
        let mut yours = EditScript::new(vec![EditOp::replace(0..4, 0..4)]);
        let mut theirs = EditScript::new(vec![
            EditOp::replace(1..2, 1..2),
            EditOp::delete(3..4, 3),
            EditOp::insert(6, 5..6),
        ]);
        align_for_merge(&mut yours, &mut theirs);

        assert_eq!(yours.ops(), &[EditOp::replace(0..4, 0..4)]);
        assert_eq!(
            theirs.ops(),
            &[EditOp::replace(0..4, 0..3), EditOp::insert(6, 5..6)]
        );
    }

    #[test]
    fn test_align_swallows_interior_insertions() {
        let mut yours = EditScript::new(vec![EditOp::replace(1..4, 1..4)]);
        let mut theirs = EditScript::new(vec![
            EditOp::insert(2, 2..3),
            EditOp::replace(3..4, 4..5),
        ]);
        align_for_merge(&mut yours, &mut theirs);

        assert_eq!(theirs.ops(), &[EditOp::replace(1..4, 1..5)]);
    }
}
