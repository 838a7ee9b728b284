//! Three-way merge example
//!
//! Resolves a merge where both branches edited the same line: one change is accepted, the
//! other appended after it, and an unrelated change is taken over as-is.

use delta_core::{ConflictSide, DiffConfig, MergeModel, SimilarDiffProvider};

const BASE: &str = "[package]
name = \"demo\"
version = \"0.1.0\"

[dependencies]
log = \"0.4\"
";
const YOURS: &str = "[package]
name = \"demo\"
version = \"0.2.0\"

[dependencies]
log = \"0.4\"
";
const THEIRS: &str = "[package]
name = \"demo\"
version = \"0.1.1\"

[dependencies]
log = \"0.4\"
serde = \"1\"
";

fn main() {
    env_logger::init();
    println!("=== Merge session example ===\n");

    let config = DiffConfig::from_toml_str("algorithm = \"patience\"").expect("config");
    let mut merge = MergeModel::from_provider(
        BASE,
        YOURS,
        THEIRS,
        &SimilarDiffProvider::new(config.algorithm),
        config,
    )
    .expect("merge");

    println!("1. Conflicts:");
    for pair in merge.conflict_pairs() {
        println!(
            "  yours #{} <-> theirs #{} ({:?})",
            pair.yours, pair.theirs, pair.kind
        );
    }

    println!("\n2. Accepting your version bump:");
    let yours = merge.diff(ConflictSide::Yours).deltas()[0].clone();
    merge.accept_delta(&yours, ConflictSide::Yours).expect("accept");
    print_base(&merge);

    println!("\n3. Accepting everything still pending on their side:");
    loop {
        let pending = merge
            .diff(ConflictSide::Theirs)
            .deltas()
            .iter()
            .find(|d| d.is_pending())
            .cloned();
        let Some(delta) = pending else { break };
        merge.accept_delta(&delta, ConflictSide::Theirs).expect("accept");
    }
    print_base(&merge);

    println!("\nResolved: {}", merge.is_resolved());
}

fn print_base(merge: &MergeModel) {
    for line in merge.base_text().lines() {
        println!("  | {line}");
    }
}
