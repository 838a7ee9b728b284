//! Delta construction from edit scripts.
//!
//! [`DeltaBuilder`] walks an [`EditScript`] once, accumulating line lengths on both sides to
//! turn line ranges into character ranges. The accumulation works on generic "units" (a
//! unit is a line here, a word token for line parts), so the same routine serves both.

use crate::content::line_lengths;
use crate::delta::{ChangeDelta, ChangeType, SideRange};
use crate::error::DiffError;
use crate::script::{EditKind, EditOp, EditScript};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between a requester and a running computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A change expressed in units and in characters on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnitChange {
    pub change_type: ChangeType,
    pub old_units: Range<usize>,
    pub new_units: Range<usize>,
    pub old_text: Range<usize>,
    pub new_text: Range<usize>,
}

/// Converts unit indices into character offsets by accumulating unit lengths.
struct Cursor<'a> {
    units: &'a [usize],
    index: usize,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(units: &'a [usize]) -> Self {
        Self {
            units,
            index: 0,
            offset: 0,
        }
    }

    /// Advance to unit `target` (never backwards) and return its character offset.
    fn advance_to(&mut self, target: usize) -> usize {
        while self.index < target {
            self.offset += self.units[self.index];
            self.index += 1;
        }
        self.offset
    }
}

fn check_op(
    index: usize,
    op: &EditOp,
    old_end: usize,
    new_end: usize,
    old_units: usize,
    new_units: usize,
) -> Result<(), DiffError> {
    if op.old.start > op.old.end || op.new.start > op.new.end {
        return Err(DiffError::malformed(index, "range start exceeds its end"));
    }
    if op.old.start < old_end || op.new.start < new_end {
        return Err(DiffError::malformed(index, "ranges are not monotonically increasing"));
    }
    if op.old.start - old_end != op.new.start - new_end {
        return Err(DiffError::malformed(
            index,
            "unchanged gap has different lengths on both sides",
        ));
    }
    if op.old.end > old_units || op.new.end > new_units {
        return Err(DiffError::malformed(index, "range exceeds the text length"));
    }
    let consistent = match op.kind {
        EditKind::Equal => op.old.len() == op.new.len(),
        EditKind::Insert => op.old.is_empty() && !op.new.is_empty(),
        EditKind::Delete => !op.old.is_empty() && op.new.is_empty(),
        EditKind::Replace => !op.old.is_empty() || !op.new.is_empty(),
    };
    if !consistent {
        return Err(DiffError::malformed(
            index,
            format!("{:?} op does not match its ranges", op.kind),
        ));
    }
    Ok(())
}

/// Validate `ops` against the unit lists and collect the changes they describe.
///
/// `cancel` is polled once per op.
pub(crate) fn unit_changes(
    old_units: &[usize],
    new_units: &[usize],
    ops: &[EditOp],
    cancel: Option<&CancelToken>,
) -> Result<Vec<UnitChange>, DiffError> {
    let mut old_cursor = Cursor::new(old_units);
    let mut new_cursor = Cursor::new(new_units);
    let (mut old_end, mut new_end) = (0, 0);
    let mut out = Vec::new();

    for (index, op) in ops.iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(DiffError::Cancelled);
        }
        check_op(index, op, old_end, new_end, old_units.len(), new_units.len())?;
        old_end = op.old.end;
        new_end = op.new.end;
        if !op.is_change() {
            continue;
        }

        let old_start = old_cursor.advance_to(op.old.start);
        let old_stop = old_cursor.advance_to(op.old.end);
        let new_start = new_cursor.advance_to(op.new.start);
        let new_stop = new_cursor.advance_to(op.new.end);
        let change_type = match op.kind {
            EditKind::Insert => ChangeType::Add,
            EditKind::Delete => ChangeType::Delete,
            _ => ChangeType::from_extents(op.old.len(), op.new.len()),
        };

        out.push(UnitChange {
            change_type,
            old_units: op.old.clone(),
            new_units: op.new.clone(),
            old_text: old_start..old_stop,
            new_text: new_start..new_stop,
        });
    }

    if old_units.len() - old_end != new_units.len() - new_end {
        return Err(DiffError::malformed(
            ops.len(),
            "trailing unchanged region has different lengths on both sides",
        ));
    }
    Ok(out)
}

/// Builds ordered [`ChangeDelta`] lists from an edit script and the two full texts.
///
/// # Example
///
/// ```rust
/// use delta_core::{ChangeType, DeltaBuilder, EditOp, EditScript};
///
/// let script = EditScript::new(vec![
///     EditOp::equal(0..1, 0..1),
///     EditOp::replace(1..2, 1..2),
///     EditOp::equal(2..3, 2..3),
/// ]);
/// let deltas = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n").build(&script).unwrap();
///
/// assert_eq!(deltas.len(), 1);
/// assert_eq!(deltas[0].change_type(), ChangeType::Modify);
/// ```
#[derive(Debug, Clone)]
pub struct DeltaBuilder<'a> {
    old: &'a str,
    new: &'a str,
    cancel: Option<CancelToken>,
}

impl<'a> DeltaBuilder<'a> {
    /// Create a builder over two LF-normalized texts.
    pub fn new(old: &'a str, new: &'a str) -> Self {
        Self {
            old,
            new,
            cancel: None,
        }
    }

    /// Poll `token` while building; a triggered token aborts with [`DiffError::Cancelled`].
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the delta list. `Equal` runs are skipped.
    pub fn build(&self, script: &EditScript) -> Result<Vec<ChangeDelta>, DiffError> {
        let old_lines = line_lengths(self.old);
        let new_lines = line_lengths(self.new);
        let changes = unit_changes(&old_lines, &new_lines, script.ops(), self.cancel.as_ref())?;

        log::debug!(
            "built {} deltas from {} script ops ({} -> {} lines)",
            changes.len(),
            script.ops().len(),
            old_lines.len(),
            new_lines.len()
        );

        Ok(changes
            .into_iter()
            .map(|change| {
                ChangeDelta::new(
                    change.change_type,
                    SideRange::new(change.old_units, change.old_text),
                    SideRange::new(change.new_units, change.new_text),
                )
            })
            .collect())
    }
}
