//! Three-way merge: conflict marking and coupled acceptance.

use delta_core::{
    ChangeSide, ChangeStatus, ConflictKind, ConflictSide, ConflictType, DiffConfig, DiffError,
    DiffEvent, EditOp, EditScript, MergeModel, SideRange, SimilarDiffProvider,
};
use std::sync::{Arc, Mutex};

fn merge(base: &str, yours: &str, theirs: &str) -> MergeModel {
    MergeModel::from_provider(
        base,
        yours,
        theirs,
        &SimilarDiffProvider::default(),
        DiffConfig::default(),
    )
    .unwrap()
}

fn first(merge: &MergeModel, side: ConflictSide) -> delta_core::ChangeDelta {
    merge.diff(side).deltas()[0].clone()
}

fn assert_shared_base(merge: &MergeModel) {
    assert_eq!(
        merge.diff(ConflictSide::Yours).text(ChangeSide::Old),
        merge.diff(ConflictSide::Theirs).text(ChangeSide::Old)
    );
}

#[test]
fn test_overlapping_changes_conflict() {
    let merge = merge("a\nb\nc\n", "a\nY\nc\n", "a\nT\nc\n");

    assert_eq!(merge.conflict_pairs().len(), 1);
    assert_eq!(merge.conflict_pairs()[0].kind, ConflictKind::Overlapping);
    assert_eq!(first(&merge, ConflictSide::Yours).conflict(), ConflictType::Conflicting);
    assert_eq!(first(&merge, ConflictSide::Theirs).conflict(), ConflictType::Conflicting);
    assert!(!merge.is_resolved());
}

#[test]
fn test_accept_both_appends_second() {
    let mut merge = merge("a\nb\nc\n", "a\nY\nc\n", "a\nT\nc\n");

    let event = merge
        .accept_delta(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap()
        .unwrap();
    assert_eq!(event.inserted_text, "Y\n");
    assert_eq!(merge.base_text(), "a\nY\nc\n");
    assert_shared_base(&merge);

    // The other side's delta now sits on the accepted content.
    let theirs = first(&merge, ConflictSide::Theirs);
    assert!(theirs.is_pending());
    assert_eq!(theirs.range(ChangeSide::Old), &SideRange::new(1..2, 2..4));

    let event = merge
        .accept_delta(&theirs, ConflictSide::Theirs)
        .unwrap()
        .unwrap();
    assert_eq!((event.offset, event.deleted_length), (4, 0));
    assert_eq!(merge.base_text(), "a\nY\nT\nc\n");
    assert_shared_base(&merge);

    let yours = first(&merge, ConflictSide::Yours);
    assert_eq!(yours.status(), ChangeStatus::Accepted);
    assert_eq!(yours.range(ChangeSide::Old), &SideRange::new(1..3, 2..6));
    assert!(merge.is_resolved());
}

#[test]
fn test_identical_changes_resolve_together() {
    let mut merge = merge("a\nb\nc\n", "a\nX\nc\n", "a\nX\nc\n");
    assert_eq!(merge.conflict_pairs()[0].kind, ConflictKind::Identical);

    merge
        .accept_delta(&first(&merge, ConflictSide::Theirs), ConflictSide::Theirs)
        .unwrap();

    assert_eq!(merge.base_text(), "a\nX\nc\n");
    assert_shared_base(&merge);
    assert_eq!(first(&merge, ConflictSide::Yours).status(), ChangeStatus::Accepted);
    assert_eq!(first(&merge, ConflictSide::Theirs).status(), ChangeStatus::Accepted);
    assert!(merge.is_resolved());
}

#[test]
fn test_enclosing_change_accepts_both() {
    let mut merge = merge("a\nb\nc\n", "a\nX\nY\nc\n", "a\nX\nc\n");
    assert_eq!(
        merge.conflict_pairs()[0].kind,
        ConflictKind::Enclosed {
            by: ConflictSide::Yours
        }
    );

    merge
        .accept_delta(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap();

    assert_eq!(merge.base_text(), "a\nX\nY\nc\n");
    assert_shared_base(&merge);
    assert_eq!(first(&merge, ConflictSide::Yours).status(), ChangeStatus::Accepted);
    assert_eq!(first(&merge, ConflictSide::Theirs).status(), ChangeStatus::Accepted);
    assert!(merge.is_resolved());
}

#[test]
fn test_enclosing_change_replaces_accepted_enclosed_one() {
    let mut merge = merge("a\nb\nc\n", "a\nX\nY\nc\n", "a\nX\nc\n");

    merge
        .accept_delta(&first(&merge, ConflictSide::Theirs), ConflictSide::Theirs)
        .unwrap();
    assert_eq!(merge.base_text(), "a\nX\nc\n");
    assert!(first(&merge, ConflictSide::Yours).is_pending());

    merge
        .accept_delta(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap();
    assert_eq!(merge.base_text(), "a\nX\nY\nc\n");
    assert_shared_base(&merge);
    assert!(merge.is_resolved());
}

#[test]
fn test_disjoint_word_changes_merge() {
    let mut merge = merge("let a = 1;\n", "let b = 1;\n", "let a = 2;\n");
    assert_eq!(merge.conflict_pairs()[0].kind, ConflictKind::WordResolvable);

    let event = merge
        .accept_delta(&first(&merge, ConflictSide::Theirs), ConflictSide::Theirs)
        .unwrap()
        .unwrap();

    assert_eq!(event.inserted_text, "let b = 2;\n");
    assert_eq!(merge.base_text(), "let b = 2;\n");
    assert_shared_base(&merge);
    assert_eq!(first(&merge, ConflictSide::Yours).status(), ChangeStatus::Accepted);
    assert_eq!(first(&merge, ConflictSide::Theirs).status(), ChangeStatus::Accepted);
    assert!(merge.is_resolved());
}

#[test]
fn test_same_word_changed_twice_is_overlapping() {
    let merge = merge("let a = 1;\n", "let b = 1;\n", "let c = 1;\n");
    assert_eq!(merge.conflict_pairs()[0].kind, ConflictKind::Overlapping);
}

#[test]
fn test_independent_changes_shift_the_other_side() {
    let mut merge = merge(
        "a\nb\nc\nd\ne\n",
        "a\nB1\nB2\nc\nd\ne\n",
        "a\nb\nc\nd\nE\n",
    );
    assert!(merge.conflict_pairs().is_empty());

    merge
        .accept_delta(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap();

    let theirs = merge.diff(ConflictSide::Theirs).deltas();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].range(ChangeSide::Old), &SideRange::new(5..6, 12..14));

    merge
        .accept_delta(&first(&merge, ConflictSide::Theirs), ConflictSide::Theirs)
        .unwrap();
    assert_eq!(merge.base_text(), "a\nB1\nB2\nc\nd\nE\n");
    assert_shared_base(&merge);
    assert!(merge.conflict_pairs().is_empty());
    assert!(merge.is_resolved());
}

#[test]
fn test_discard_clears_conflict() {
    let mut merge = merge("a\nb\nc\n", "a\nY\nc\n", "a\nT\nc\n");

    merge
        .discard_change(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap();

    assert!(merge.conflict_pairs().is_empty());
    assert_eq!(first(&merge, ConflictSide::Theirs).conflict(), ConflictType::None);
    assert_eq!(merge.base_text(), "a\nb\nc\n");
    assert_eq!(merge.text(ConflictSide::Yours), "a\nb\nc\n");
}

#[test]
fn test_base_edit_reaches_both_sides() {
    let mut merge = merge("a\nb\nc\n", "a\nY\nc\n", "a\nT\nc\n");
    merge.modify_text("z\n", 0, 0).unwrap();

    assert_eq!(merge.base_text(), "z\na\nb\nc\n");
    assert_shared_base(&merge);
    for side in [ConflictSide::Yours, ConflictSide::Theirs] {
        let deltas = merge.diff(side).deltas();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].range(ChangeSide::Old), &SideRange::new(2..3, 4..6));
        assert_eq!(deltas[0].range(ChangeSide::New), &SideRange::new(1..2, 2..4));
    }
    assert_eq!(merge.conflict_pairs().len(), 1);
}

#[test]
fn test_base_edit_out_of_range() {
    let mut merge = merge("a\nb\nc\n", "a\nY\nc\n", "a\nT\nc\n");
    assert_eq!(
        merge.modify_text("x", 5, 10),
        Err(DiffError::Range {
            offset: 10,
            length: 5,
            len: 6,
        })
    );
    assert_eq!(merge.base_text(), "a\nb\nc\n");
}

#[test]
fn test_provider_aligns_overlapping_changes() {
    // yours rewrites lines 1..3, theirs only line 2
    let merge = merge("a\nb\nc\nd\n", "a\nX\nY\nd\n", "a\nb\nT\nd\n");

    let yours = first(&merge, ConflictSide::Yours);
    let theirs = first(&merge, ConflictSide::Theirs);
    assert_eq!(yours.range(ChangeSide::Old), theirs.range(ChangeSide::Old));
    assert_eq!(theirs.range(ChangeSide::Old), &SideRange::new(1..3, 2..6));
    assert_eq!(theirs.range(ChangeSide::New), &SideRange::new(1..3, 2..6));
    assert_eq!(merge.conflict_pairs()[0].kind, ConflictKind::Overlapping);
}

#[test]
fn test_unaligned_scripts_still_conflict() {
    let yours = EditScript::new(vec![EditOp::replace(1..3, 1..3)]);
    let theirs = EditScript::new(vec![EditOp::replace(2..3, 2..3)]);
    let merge = MergeModel::new(
        "a\nb\nc\nd\n",
        "a\nX\nY\nd\n",
        "a\nb\nT\nd\n",
        &yours,
        &theirs,
    )
    .unwrap();

    let pair = merge.conflict_pairs()[0];
    assert_eq!((pair.yours, pair.theirs), (0, 0));
    assert_eq!(pair.index(ConflictSide::Theirs), 0);
    assert_eq!(first(&merge, ConflictSide::Theirs).range(ChangeSide::Old).text, 4..6);
}

#[test]
fn test_conflict_marks_are_symmetric() {
    let merge = merge(
        "a\nb\nc\nd\ne\nf\n",
        "a\nB\nc\nd\nE\nf\n",
        "a\nb\nc\nD\nX\nf\n",
    );
    let yours = merge.diff(ConflictSide::Yours).deltas();
    let theirs = merge.diff(ConflictSide::Theirs).deltas();

    for y in yours {
        for t in theirs {
            assert_eq!(y.is_conflicting_with(t), t.is_conflicting_with(y));
        }
    }
    for pair in merge.conflict_pairs() {
        assert_eq!(yours[pair.yours].conflict(), ConflictType::Conflicting);
        assert_eq!(theirs[pair.theirs].conflict(), ConflictType::Conflicting);
    }
    // Only "e" was touched by both; alignment widens yours to "d" as well.
    assert_eq!(merge.conflict_pairs().len(), 1);
    assert_eq!(yours[0].conflict(), ConflictType::None);
    assert_eq!(yours[1].range(ChangeSide::Old), theirs[0].range(ChangeSide::Old));
}

#[test]
fn test_reset_restores_conflicts() {
    let mut merge = merge("a\nb\nc\n", "a\nY\nc\n", "a\nT\nc\n");
    merge
        .accept_delta(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap();
    merge.reset();

    assert_eq!(merge.base_text(), "a\nb\nc\n");
    assert_shared_base(&merge);
    assert_eq!(merge.conflict_pairs().len(), 1);
    assert!(first(&merge, ConflictSide::Yours).is_pending());
}

#[test]
fn test_subscribers_see_the_other_side_move() {
    let mut merge = merge(
        "a\nb\nc\nd\ne\n",
        "a\nB1\nB2\nc\nd\ne\n",
        "a\nb\nc\nd\nE\n",
    );
    let versions: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let versions_cb = versions.clone();
    merge.subscribe(ConflictSide::Theirs, move |event| {
        if let DiffEvent::DeltaListChanged(snapshot) = event {
            versions_cb.lock().expect("lock").push(snapshot.version);
        }
    });

    merge
        .accept_delta(&first(&merge, ConflictSide::Yours), ConflictSide::Yours)
        .unwrap();

    assert_eq!(versions.lock().expect("lock").as_slice(), &[1]);
}
