//! Word-granular sub-changes inside a delta.

use crate::builder::unit_changes;
use crate::delta::{ChangeSide, ChangeType, ranges_conflict, shift};
use crate::error::DiffError;
use crate::script::EditScript;
use similar::{Algorithm, capture_diff_slices};
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// A changed region inside a [`ChangeDelta`](crate::ChangeDelta), in absolute character
/// offsets of each side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinePartDelta {
    /// Kind of the sub-change.
    pub change_type: ChangeType,
    /// Character range on the OLD side.
    pub old: Range<usize>,
    /// Character range on the NEW side.
    pub new: Range<usize>,
}

impl LinePartDelta {
    /// Character range on the given side.
    pub fn range(&self, side: ChangeSide) -> &Range<usize> {
        match side {
            ChangeSide::Old => &self.old,
            ChangeSide::New => &self.new,
        }
    }

    /// Whether both parts touch the same OLD characters, by the rule of
    /// [`ChangeDelta::is_conflicting_with`](crate::ChangeDelta::is_conflicting_with).
    pub fn is_conflicting_with(&self, other: &LinePartDelta) -> bool {
        ranges_conflict(&self.old, &other.old)
    }

    pub(crate) fn shifted(&self, side: ChangeSide, by: isize) -> Self {
        let mut out = self.clone();
        let range = match side {
            ChangeSide::Old => &mut out.old,
            ChangeSide::New => &mut out.new,
        };
        *range = shift(range.start, by)..shift(range.end, by);
        out
    }
}

fn tokens(text: &str, by_words: bool) -> Vec<&str> {
    if by_words {
        text.split_word_bounds().collect()
    } else {
        text.split_inclusive('\n').collect()
    }
}

/// Diff two delta contents token by token and lay the changes out at `old_base`/`new_base`.
pub(crate) fn derive(
    old: &str,
    new: &str,
    old_base: usize,
    new_base: usize,
    by_words: bool,
) -> Result<Vec<LinePartDelta>, DiffError> {
    let old_tokens = tokens(old, by_words);
    let new_tokens = tokens(new, by_words);
    let ops = capture_diff_slices(Algorithm::Myers, &old_tokens, &new_tokens);
    let script = EditScript::from_diff_ops(&ops);

    let old_units: Vec<usize> = old_tokens.iter().map(|t| t.chars().count()).collect();
    let new_units: Vec<usize> = new_tokens.iter().map(|t| t.chars().count()).collect();

    let parts = unit_changes(&old_units, &new_units, script.ops(), None)?
        .into_iter()
        .map(|change| LinePartDelta {
            change_type: change.change_type,
            old: change.old_text.start + old_base..change.old_text.end + old_base,
            new: change.new_text.start + new_base..change.new_text.end + new_base,
        })
        .collect();
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_change() {
        let parts = derive("let a = 1;\n", "let b = 1;\n", 10, 20, true).unwrap();
        assert_eq!(
            parts,
            vec![LinePartDelta {
                change_type: ChangeType::Modify,
                old: 14..15,
                new: 24..25,
            }]
        );
    }

    #[test]
    fn test_line_granularity() {
        let parts = derive("a\nb\nc\n", "a\nB\nc\n", 0, 0, false).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].old, 2..4);
        assert_eq!(parts[0].new, 2..4);
    }
}
