//! Edit script to delta conversion.

use delta_core::{
    CancelToken, ChangeSide, ChangeType, DeltaBuilder, DiffError, EditKind, EditOp, EditScript,
    SideRange,
};

#[test]
fn test_single_line_modify() {
    let script = EditScript::new(vec![
        EditOp::equal(0..1, 0..1),
        EditOp::replace(1..2, 1..2),
        EditOp::equal(2..3, 2..3),
    ]);
    let deltas = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n")
        .build(&script)
        .unwrap();

    assert_eq!(deltas.len(), 1);
    let delta = &deltas[0];
    assert_eq!(delta.change_type(), ChangeType::Modify);
    assert_eq!(delta.range(ChangeSide::Old), &SideRange::new(1..2, 2..4));
    assert_eq!(delta.range(ChangeSide::New), &SideRange::new(1..2, 2..4));
    assert!(delta.is_pending());
}

#[test]
fn test_insert_becomes_add_with_point_on_old() {
    let script = EditScript::new(vec![
        EditOp::equal(0..1, 0..1),
        EditOp::insert(1, 1..3),
        EditOp::equal(1..2, 3..4),
    ]);
    let deltas = DeltaBuilder::new("a\nb\n", "a\nx\ny\nb\n")
        .build(&script)
        .unwrap();

    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].change_type(), ChangeType::Add);
    assert_eq!(deltas[0].range(ChangeSide::Old), &SideRange::point(1, 2));
    assert_eq!(deltas[0].range(ChangeSide::New), &SideRange::new(1..3, 2..6));
}

#[test]
fn test_delete_has_point_on_new() {
    let script = EditScript::new(vec![
        EditOp::equal(0..1, 0..1),
        EditOp::delete(1..2, 1),
        EditOp::equal(2..3, 1..2),
    ]);
    let deltas = DeltaBuilder::new("a\nb\nc\n", "a\nc\n")
        .build(&script)
        .unwrap();

    assert_eq!(deltas[0].change_type(), ChangeType::Delete);
    assert_eq!(deltas[0].range(ChangeSide::Old), &SideRange::new(1..2, 2..4));
    assert_eq!(deltas[0].range(ChangeSide::New), &SideRange::point(1, 2));
}

#[test]
fn test_equal_runs_are_optional() {
    // Gaps between change ops are unchanged regions too.
    let full = EditScript::new(vec![
        EditOp::equal(0..1, 0..1),
        EditOp::replace(1..2, 1..2),
        EditOp::equal(2..3, 2..3),
    ]);
    let sparse = EditScript::new(vec![EditOp::replace(1..2, 1..2)]);

    let builder = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n");
    assert_eq!(builder.build(&full).unwrap(), builder.build(&sparse).unwrap());
}

#[test]
fn test_several_deltas_accumulate_offsets() {
    let old = "a\nb\nc\nd\ne\n";
    let new = "a\nB1\nB2\nc\nd\nE\n";
    let script = EditScript::new(vec![
        EditOp::equal(0..1, 0..1),
        EditOp::replace(1..2, 1..3),
        EditOp::equal(2..4, 3..5),
        EditOp::replace(4..5, 5..6),
    ]);
    let deltas = DeltaBuilder::new(old, new).build(&script).unwrap();

    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0].range(ChangeSide::New), &SideRange::new(1..3, 2..8));
    assert_eq!(deltas[1].range(ChangeSide::Old), &SideRange::new(4..5, 8..10));
    assert_eq!(deltas[1].range(ChangeSide::New), &SideRange::new(5..6, 12..14));
}

#[test]
fn test_offsets_count_chars_not_bytes() {
    let script = EditScript::new(vec![EditOp::replace(1..2, 1..2)]);
    let deltas = DeltaBuilder::new("héllo\nwörld\n", "héllo\nwörld!\n")
        .build(&script)
        .unwrap();

    assert_eq!(deltas[0].range(ChangeSide::Old).text, 6..12);
    assert_eq!(deltas[0].range(ChangeSide::New).text, 6..13);
}

#[test]
fn test_last_line_without_newline() {
    let script = EditScript::new(vec![EditOp::equal(0..1, 0..1), EditOp::replace(1..2, 1..2)]);
    let deltas = DeltaBuilder::new("a\nb", "a\nc").build(&script).unwrap();

    assert_eq!(deltas[0].range(ChangeSide::Old), &SideRange::new(1..2, 2..3));
    assert_eq!(deltas[0].range(ChangeSide::New), &SideRange::new(1..2, 2..3));
}

#[test]
fn test_non_monotonic_script_is_rejected() {
    let script = EditScript::new(vec![
        EditOp::replace(2..3, 2..3),
        EditOp::replace(0..1, 0..1),
    ]);
    let result = DeltaBuilder::new("a\nb\nc\n", "x\ny\nz\n").build(&script);
    assert!(matches!(
        result,
        Err(DiffError::MalformedEditScript { index: 1, .. })
    ));
}

#[test]
fn test_range_past_text_end_is_rejected() {
    let script = EditScript::new(vec![EditOp::replace(1..5, 1..2)]);
    let result = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n").build(&script);
    assert!(matches!(
        result,
        Err(DiffError::MalformedEditScript { index: 0, .. })
    ));
}

#[test]
fn test_kind_must_match_ranges() {
    let script = EditScript::new(vec![EditOp::new(EditKind::Insert, 1..2, 1..2)]);
    let result = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n").build(&script);
    assert!(matches!(
        result,
        Err(DiffError::MalformedEditScript { index: 0, .. })
    ));
}

#[test]
fn test_trailing_region_must_match() {
    // The script claims nothing changed, but NEW has an extra line.
    let script = EditScript::new(vec![EditOp::equal(0..1, 0..1)]);
    let result = DeltaBuilder::new("a\n", "a\nb\n").build(&script);
    assert!(matches!(
        result,
        Err(DiffError::MalformedEditScript { index: 1, .. })
    ));
}

#[test]
fn test_cancelled_build() {
    let token = CancelToken::new();
    token.cancel();
    let script = EditScript::new(vec![EditOp::replace(1..2, 1..2)]);
    let result = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n")
        .with_cancel(token)
        .build(&script);
    assert_eq!(result, Err(DiffError::Cancelled));
}

#[test]
fn test_untriggered_token_does_not_interfere() {
    let token = CancelToken::new();
    let script = EditScript::new(vec![EditOp::replace(1..2, 1..2)]);
    let deltas = DeltaBuilder::new("a\nb\nc\n", "a\nx\nc\n")
        .with_cancel(token.clone())
        .build(&script)
        .unwrap();
    assert_eq!(deltas.len(), 1);
    assert!(!token.is_cancelled());
}
