//! Three-way merge on top of two coupled [`FileDiffModel`]s.
//!
//! Both models share the base (fork-point) text as their OLD side: `yours` diffs the base
//! against your version, `theirs` against the other branch. Accepting a delta from either
//! side writes into the base of its own model, and the same splice is then replayed as an
//! OLD-side edit on the other model, so both bases stay identical at all times.

use std::ops::Range;

use crate::config::DiffConfig;
use crate::content::LineEnding;
use crate::delta::{ChangeDelta, ChangeSide, ChangeStatus, ChangeType, ConflictType};
use crate::error::DiffError;
use crate::events::{DiffEvent, TextChangeEvent};
use crate::file_diff::{BuiltDiff, EditMode, FileDiffModel};
use crate::script::{DiffProvider, EditScript, align_for_merge};

/// The branch a merge delta belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictSide {
    /// Your branch.
    Yours,
    /// The other branch.
    Theirs,
}

impl ConflictSide {
    /// The opposite branch.
    pub fn other(self) -> Self {
        match self {
            Self::Yours => Self::Theirs,
            Self::Theirs => Self::Yours,
        }
    }
}

/// How two conflicting deltas relate.
///
/// Every kind except [`ConflictKind::Overlapping`] requires both deltas to cover the same
/// base range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// The deltas overlap on the base and need a decision.
    Overlapping,
    /// Both branches made the same change to the same base range; accepting one accepts the
    /// other.
    Identical,
    /// One branch's new content contains the other's. Accepting the enclosing delta accepts
    /// the enclosed one as well. Accepting the enclosed one first leaves the enclosing one to
    /// replace it later.
    Enclosed {
        /// The branch whose delta encloses the other.
        by: ConflictSide,
    },
    /// The word-level changes of two pending deltas touch disjoint parts of the base.
    /// Accepting either applies both sets of word changes and accepts both deltas.
    WordResolvable,
}

/// A pair of conflicting deltas, by index into each model's current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConflictPair {
    /// Index into the `yours` model.
    pub yours: usize,
    /// Index into the `theirs` model.
    pub theirs: usize,
    /// Relation between the two deltas.
    pub kind: ConflictKind,
}

impl ConflictPair {
    /// Index of the pair's delta on `side`.
    pub fn index(&self, side: ConflictSide) -> usize {
        match side {
            ConflictSide::Yours => self.yours,
            ConflictSide::Theirs => self.theirs,
        }
    }
}

/// Three-way merge state.
///
/// # Example
///
/// ```rust
/// use delta_core::{ConflictSide, ConflictType, DiffConfig, MergeModel, SimilarDiffProvider};
///
/// let mut merge = MergeModel::from_provider(
///     "a\nb\nc\n",
///     "a\nY\nc\n",
///     "a\nT\nc\n",
///     &SimilarDiffProvider::default(),
///     DiffConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(merge.conflict_pairs().len(), 1);
///
/// let yours = merge.diff(ConflictSide::Yours).deltas()[0].clone();
/// assert_eq!(yours.conflict(), ConflictType::Conflicting);
///
/// merge.accept_delta(&yours, ConflictSide::Yours).unwrap();
/// assert_eq!(merge.base_text(), "a\nY\nc\n");
/// ```
pub struct MergeModel {
    yours: FileDiffModel,
    theirs: FileDiffModel,
    pairs: Vec<ConflictPair>,
}

impl MergeModel {
    /// Build a merge from raw texts and one edit script per branch (each against `base`).
    pub fn new(
        base: &str,
        yours: &str,
        theirs: &str,
        yours_script: &EditScript,
        theirs_script: &EditScript,
    ) -> Result<Self, DiffError> {
        Self::with_config(
            base,
            yours,
            theirs,
            yours_script,
            theirs_script,
            DiffConfig::default(),
        )
    }

    /// Like [`MergeModel::new`], with an explicit configuration.
    pub fn with_config(
        base: &str,
        yours: &str,
        theirs: &str,
        yours_script: &EditScript,
        theirs_script: &EditScript,
        config: DiffConfig,
    ) -> Result<Self, DiffError> {
        let yours = BuiltDiff::from_script(base, yours, yours_script)?;
        let theirs = BuiltDiff::from_script(base, theirs, theirs_script)?;
        Ok(Self::from_models(
            FileDiffModel::from_built(yours, config.clone()),
            FileDiffModel::from_built(theirs, config),
        ))
    }

    /// Build a merge, asking `provider` for both edit scripts and aligning them so that
    /// overlapping changes cover the same base lines.
    pub fn from_provider<P>(
        base: &str,
        yours: &str,
        theirs: &str,
        provider: &P,
        config: DiffConfig,
    ) -> Result<Self, DiffError>
    where
        P: DiffProvider + ?Sized,
    {
        let base_text = LineEnding::normalize(base);
        let mut yours_script = provider.edit_script(&base_text, &LineEnding::normalize(yours));
        let mut theirs_script = provider.edit_script(&base_text, &LineEnding::normalize(theirs));
        align_for_merge(&mut yours_script, &mut theirs_script);
        Self::with_config(base, yours, theirs, &yours_script, &theirs_script, config)
    }

    fn from_models(yours: FileDiffModel, theirs: FileDiffModel) -> Self {
        let mut merge = Self {
            yours,
            theirs,
            pairs: Vec::new(),
        };
        merge.mark_conflicting();
        merge
    }

    /// The two-way model of one branch.
    pub fn diff(&self, side: ConflictSide) -> &FileDiffModel {
        match side {
            ConflictSide::Yours => &self.yours,
            ConflictSide::Theirs => &self.theirs,
        }
    }

    /// Current base text.
    pub fn base_text(&self) -> String {
        self.yours.text(ChangeSide::Old)
    }

    /// Current text of one branch.
    pub fn text(&self, side: ConflictSide) -> String {
        self.diff(side).text(ChangeSide::New)
    }

    /// Conflict pairs found by the last [`MergeModel::mark_conflicting`].
    pub fn conflict_pairs(&self) -> &[ConflictPair] {
        &self.pairs
    }

    /// Subscribe to the events of one branch's model.
    pub fn subscribe<F>(&mut self, side: ConflictSide, callback: F)
    where
        F: FnMut(&DiffEvent) + Send + 'static,
    {
        self.model_mut(side).subscribe(callback);
    }

    /// Whether no delta on either side is still pending or undefined.
    pub fn is_resolved(&self) -> bool {
        [&self.yours, &self.theirs].iter().all(|model| {
            model.deltas().iter().all(|d| {
                !matches!(d.status(), ChangeStatus::Pending | ChangeStatus::Undefined)
            })
        })
    }

    /// Accept a delta of `side` into the base.
    ///
    /// - With a pending `Identical`, `WordResolvable` or enclosed counterpart, both deltas are
    ///   accepted in one step and both bases receive the same content.
    /// - An enclosing delta accepted after its enclosed counterpart replaces it.
    /// - If an overlapping counterpart was already accepted, the delta's content is appended
    ///   after it instead of replacing it.
    /// - Otherwise the delta replaces its base range. The other side's deltas after it shift,
    ///   and an overlapping one is re-anchored onto the new base content.
    pub fn accept_delta(
        &mut self,
        delta: &ChangeDelta,
        side: ConflictSide,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        let index = self.diff(side).position_of(delta)?;
        if !delta.is_pending() {
            return self.model_mut(side).accept_at(index);
        }
        let partners: Vec<(usize, ConflictKind)> = self
            .pairs
            .iter()
            .filter(|pair| pair.index(side) == index)
            .map(|pair| (pair.index(side.other()), pair.kind))
            .collect();

        let other = self.diff(side.other());
        let status_of = |i: usize| other.delta(i).map(ChangeDelta::status);
        let joint = partners.iter().copied().find(|&(i, kind)| {
            let resolvable = match kind {
                ConflictKind::Identical | ConflictKind::WordResolvable => true,
                ConflictKind::Enclosed { by } => by == side,
                ConflictKind::Overlapping => false,
            };
            resolvable && status_of(i) == Some(ChangeStatus::Pending)
        });
        // An accepted enclosed partner is replaced, not appended to.
        let partner_accepted = partners.iter().any(|&(i, kind)| {
            kind != ConflictKind::Enclosed { by: side }
                && status_of(i) == Some(ChangeStatus::Accepted)
        });

        let joint = match joint {
            Some((partner, ConflictKind::WordResolvable)) => {
                Some((partner, self.word_merged(side, index, partner)?))
            }
            Some((partner, _)) => {
                let own = self.diff(side).side_text(ChangeSide::New);
                Some((partner, delta.content(ChangeSide::New, own)))
            }
            None => None,
        };

        let (owner, other) = match side {
            ConflictSide::Yours => (&mut self.yours, &mut self.theirs),
            ConflictSide::Theirs => (&mut self.theirs, &mut self.yours),
        };
        let event = if let Some((partner, content)) = &joint {
            let event = owner.accept_with(index, content.clone())?;
            other.accept_with(*partner, content.clone())?;
            event
        } else {
            let event = if partner_accepted {
                owner.append_at(index)?
            } else {
                owner.accept_at(index)?
            };
            if let Some(event) = &event {
                other.apply_text_edit(
                    ChangeSide::Old,
                    event.offset,
                    event.deleted_length,
                    &event.inserted_text,
                    if partner_accepted {
                        EditMode::RebaseAppend
                    } else {
                        EditMode::Rebase
                    },
                )?;
            }
            event
        };

        log::debug!(
            "accepted {side:?} delta {index} (joint partner: {:?}, appended: {partner_accepted})",
            joint.as_ref().map(|(partner, _)| partner)
        );
        self.mark_conflicting();
        Ok(event)
    }

    /// Discard a delta of `side`. The base is unchanged.
    pub fn discard_change(
        &mut self,
        delta: &ChangeDelta,
        side: ConflictSide,
    ) -> Result<Option<TextChangeEvent>, DiffError> {
        let event = self.model_mut(side).discard_change(delta)?;
        self.mark_conflicting();
        Ok(event)
    }

    /// Apply a live edit to the base text of both models.
    ///
    /// Deltas the edit falls into absorb it; everything after it shifts. An edit between
    /// deltas creates no new delta, since the base is what both branches are compared to.
    pub fn modify_text(
        &mut self,
        text: &str,
        length: usize,
        offset: usize,
    ) -> Result<(), DiffError> {
        let len = self.yours.side_text(ChangeSide::Old).len_chars();
        if offset.checked_add(length).is_none_or(|end| end > len) {
            return Err(DiffError::Range {
                offset,
                length,
                len,
            });
        }
        self.yours
            .apply_text_edit(ChangeSide::Old, offset, length, text, EditMode::Rebase)?;
        self.theirs
            .apply_text_edit(ChangeSide::Old, offset, length, text, EditMode::Rebase)?;
        self.mark_conflicting();
        Ok(())
    }

    /// Return both models to their built state.
    pub fn reset(&mut self) {
        self.yours.reset();
        self.theirs.reset();
        self.mark_conflicting();
    }

    /// Recompute conflict markers on both sides.
    ///
    /// Every pair of non-discarded deltas that overlap on the base is marked conflicting;
    /// every other delta is cleared.
    pub fn mark_conflicting(&mut self) -> &[ConflictPair] {
        let yours = self.yours.deltas();
        let theirs = self.theirs.deltas();
        let mut yours_flags = vec![ConflictType::None; yours.len()];
        let mut theirs_flags = vec![ConflictType::None; theirs.len()];
        let mut pairs = Vec::new();

        let live = |d: &ChangeDelta| d.status() != ChangeStatus::Discarded;
        for (i, y) in yours.iter().enumerate().filter(|(_, d)| live(d)) {
            for (j, t) in theirs.iter().enumerate().filter(|(_, d)| live(d)) {
                if !y.is_conflicting_with(t) {
                    continue;
                }
                yours_flags[i] = ConflictType::Conflicting;
                theirs_flags[j] = ConflictType::Conflicting;
                pairs.push(ConflictPair {
                    yours: i,
                    theirs: j,
                    kind: self.classify(i, j),
                });
            }
        }

        self.yours.set_conflicts(&yours_flags);
        self.theirs.set_conflicts(&theirs_flags);
        self.pairs = pairs;
        &self.pairs
    }

    /// Relation of a conflicting pair, from the most to the least specific kind.
    fn classify(&self, yours: usize, theirs: usize) -> ConflictKind {
        let (y, t) = match (self.yours.delta(yours), self.theirs.delta(theirs)) {
            (Some(y), Some(t)) => (y, t),
            _ => return ConflictKind::Overlapping,
        };
        if y.range(ChangeSide::Old) != t.range(ChangeSide::Old) {
            return ConflictKind::Overlapping;
        }
        let y_new = y.content(ChangeSide::New, self.yours.side_text(ChangeSide::New));
        let t_new = t.content(ChangeSide::New, self.theirs.side_text(ChangeSide::New));
        if y_new == t_new {
            return ConflictKind::Identical;
        }

        let deletes = [y, t].iter().any(|d| d.change_type() == ChangeType::Delete);
        if !deletes && y_new.contains(&t_new) {
            return ConflictKind::Enclosed {
                by: ConflictSide::Yours,
            };
        }
        if !deletes && t_new.contains(&y_new) {
            return ConflictKind::Enclosed {
                by: ConflictSide::Theirs,
            };
        }

        let disjoint = match (
            self.yours.line_part_changes(yours),
            self.theirs.line_part_changes(theirs),
        ) {
            (Ok(y_parts), Ok(t_parts)) if y.is_pending() && t.is_pending() => {
                !y_parts.is_empty()
                    && !t_parts.is_empty()
                    && y_parts
                        .iter()
                        .all(|p| t_parts.iter().all(|q| !p.is_conflicting_with(q)))
            }
            _ => false,
        };
        if disjoint {
            ConflictKind::WordResolvable
        } else {
            ConflictKind::Overlapping
        }
    }

    /// Base content of a `WordResolvable` pair with the word changes of both sides applied.
    fn word_merged(
        &self,
        side: ConflictSide,
        index: usize,
        partner: usize,
    ) -> Result<String, DiffError> {
        let (own, other) = (self.diff(side), self.diff(side.other()));
        let base = own.side_text(ChangeSide::Old);
        let range = own
            .delta(index)
            .ok_or(DiffError::DeltaIndex {
                index,
                len: own.deltas().len(),
            })?
            .range(ChangeSide::Old)
            .text
            .clone();

        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        for (model, at) in [(own, index), (other, partner)] {
            let new = model.side_text(ChangeSide::New);
            for part in model.line_part_changes(at)?.iter() {
                edits.push((part.old.clone(), new.slice(&part.new)));
            }
        }
        edits.sort_by_key(|(old, _)| (old.start, old.end));

        let mut merged = String::new();
        let mut at = range.start;
        for (old, text) in edits {
            let start = old.start.max(at);
            merged.push_str(&base.slice(&(at..start)));
            merged.push_str(&text);
            at = old.end.max(start);
        }
        merged.push_str(&base.slice(&(at..range.end.max(at))));
        Ok(merged)
    }

    fn model_mut(&mut self, side: ConflictSide) -> &mut FileDiffModel {
        match side {
            ConflictSide::Yours => &mut self.yours,
            ConflictSide::Theirs => &mut self.theirs,
        }
    }
}
