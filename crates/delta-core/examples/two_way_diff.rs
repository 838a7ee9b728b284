//! Two-way diff example
//!
//! Builds a diff between two versions of a file, types into the live side, then accepts and
//! discards changes while printing the delta list after every step.

use delta_core::{ChangeSide, DiffConfig, DiffEvent, FileDiffModel, SimilarDiffProvider};

const OLD: &str = "fn main() {\n    let x = 1;\n    println!(\"{x}\");\n}\n";
const NEW: &str = "fn main() {\n    let x = 2;\n    let y = 3;\n    println!(\"{x}\");\n}\n";

fn main() {
    env_logger::init();
    println!("=== Two-way diff example ===\n");

    let mut model = FileDiffModel::from_provider(
        OLD,
        NEW,
        &SimilarDiffProvider::default(),
        DiffConfig::default(),
    )
    .expect("diff");

    model.subscribe(|event| match event {
        DiffEvent::TextChanged(change) => println!(
            "  [event] {:?} splice at {}: -{} +{:?}",
            change.side, change.offset, change.deleted_length, change.inserted_text
        ),
        DiffEvent::DeltaListChanged(snapshot) => {
            println!("  [event] version {}: {} deltas", snapshot.version, snapshot.len())
        }
    });

    println!("1. Initial deltas:");
    print_deltas(&model);

    println!("\n2. Word-level changes of the first delta:");
    for part in model.line_part_changes(0).expect("line parts").iter() {
        println!(
            "  {:?}: {:?} -> {:?}",
            part.change_type,
            model.side_text(ChangeSide::Old).slice(&part.old),
            model.side_text(ChangeSide::New).slice(&part.new)
        );
    }

    println!("\n3. Typing a comment at the top of the NEW side:");
    model.process_text_event(0, 0, "// demo\n").expect("edit");
    print_deltas(&model);

    println!("\n4. Accepting the rewritten lines:");
    let index = model.deltas().len() - 1;
    model.accept_at(index).expect("accept");
    print_deltas(&model);

    println!("\n5. Discarding the comment:");
    model.discard_at(0).expect("discard");
    print_deltas(&model);

    println!("\nOLD text now:\n{}", model.text(ChangeSide::Old));
    println!("NEW text now:\n{}", model.text(ChangeSide::New));
}

fn print_deltas(model: &FileDiffModel) {
    for (i, delta) in model.deltas().iter().enumerate() {
        let old = delta.range(ChangeSide::Old);
        let new = delta.range(ChangeSide::New);
        println!(
            "  #{i} {:?} {:?}: old lines {:?} chars {:?} | new lines {:?} chars {:?}",
            delta.change_type(),
            delta.status(),
            old.lines,
            old.text,
            new.lines,
            new.text
        );
    }
}
